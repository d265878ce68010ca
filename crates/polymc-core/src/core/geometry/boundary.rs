use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum BoundaryError {
    #[error("Invalid box length on axis {axis}: {value} (must be finite and non-negative)")]
    InvalidBoxLength { axis: char, value: f64 },
    #[error("A periodic box needs positive x and y lengths, got {x} x {y}")]
    DegenerateBox { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    Free,
    Periodic,
}

/// Distance semantics of the simulation cell.
///
/// Under [`BoundaryKind::Periodic`] every axis with a positive box length wraps
/// toroidally; an axis whose length is zero stays unbounded, which is how planar
/// systems leave `z` open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    kind: BoundaryKind,
    box_length: Vector3<f64>,
    half_box: Vector3<f64>,
}

impl Boundary {
    pub fn free() -> Self {
        Self {
            kind: BoundaryKind::Free,
            box_length: Vector3::zeros(),
            half_box: Vector3::zeros(),
        }
    }

    pub fn periodic(box_length: Vector3<f64>) -> Result<Self, BoundaryError> {
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(box_length.iter().copied()) {
            if !value.is_finite() || value < 0.0 {
                return Err(BoundaryError::InvalidBoxLength { axis, value });
            }
        }
        if box_length.x <= 0.0 || box_length.y <= 0.0 {
            return Err(BoundaryError::DegenerateBox {
                x: box_length.x,
                y: box_length.y,
            });
        }
        Ok(Self {
            kind: BoundaryKind::Periodic,
            box_length,
            half_box: box_length * 0.5,
        })
    }

    pub fn from_kind(kind: BoundaryKind, box_length: Vector3<f64>) -> Result<Self, BoundaryError> {
        match kind {
            BoundaryKind::Free => Ok(Self::free()),
            BoundaryKind::Periodic => Self::periodic(box_length),
        }
    }

    #[inline]
    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.kind == BoundaryKind::Periodic
    }

    #[inline]
    pub fn box_length(&self) -> &Vector3<f64> {
        &self.box_length
    }

    /// Folds a position back into `[0, L)` on every periodic axis.
    ///
    /// Only correct for positions at most one box length outside the cell,
    /// which is all a single trial displacement can produce.
    #[inline]
    pub fn wrap(&self, position: &Vector3<f64>) -> Vector3<f64> {
        if !self.is_periodic() {
            return *position;
        }
        let mut wrapped = *position;
        for axis in 0..3 {
            let length = self.box_length[axis];
            if length <= 0.0 {
                continue;
            }
            if wrapped[axis] < 0.0 {
                wrapped[axis] += length;
            }
            if wrapped[axis] >= length {
                wrapped[axis] -= length;
            }
        }
        wrapped
    }

    #[inline]
    pub fn minimum_image(&self, displacement: &Vector3<f64>) -> Vector3<f64> {
        if !self.is_periodic() {
            return *displacement;
        }
        let mut image = *displacement;
        for axis in 0..3 {
            let length = self.box_length[axis];
            if length <= 0.0 {
                continue;
            }
            let half = self.half_box[axis];
            if image[axis] > half {
                image[axis] -= length;
            } else if image[axis] < -half {
                image[axis] += length;
            }
        }
        image
    }

    /// Minimum-image separation vector pointing from `from` to `to`.
    #[inline]
    pub fn separation(&self, from: &Vector3<f64>, to: &Vector3<f64>) -> Vector3<f64> {
        self.minimum_image(&(to - from))
    }

    #[inline]
    pub fn squared_distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        self.separation(a, b).norm_squared()
    }

    #[inline]
    pub fn distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        self.squared_distance(a, b).sqrt()
    }

    /// Cosine of the bond angle at vertex `b`, measured between the legs `b - a`
    /// and `c - b`. A straight triple gives `1.0`.
    ///
    /// Coincident points produce NaN; callers detect the non-finite result.
    #[inline]
    pub fn cos_angle(&self, a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
        let leg_ab = self.separation(a, b);
        let leg_bc = self.separation(b, c);
        leg_ab.dot(&leg_bc) / (leg_ab.norm() * leg_bc.norm())
    }

    /// Returns the first pair of particles closer than `min_distance`, if any.
    pub fn find_overlap(
        &self,
        positions: &[Vector3<f64>],
        min_distance: f64,
    ) -> Option<(usize, usize)> {
        let threshold_sq = min_distance * min_distance;
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if self.squared_distance(&positions[i], &positions[j]) < threshold_sq {
                    return Some((i, j));
                }
            }
        }
        None
    }

    #[inline]
    pub fn has_overlap(&self, positions: &[Vector3<f64>], min_distance: f64) -> bool {
        self.find_overlap(positions, min_distance).is_some()
    }
}
