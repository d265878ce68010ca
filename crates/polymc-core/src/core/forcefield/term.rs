use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// Bonded energy split by interaction type, in thermal units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyTerm {
    pub bond: f64,
    pub angle: f64,
}

impl EnergyTerm {
    pub fn new(bond: f64, angle: f64) -> Self {
        Self { bond, angle }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.bond + self.angle
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.bond.is_finite() && self.angle.is_finite()
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond + rhs.bond,
            angle: self.angle + rhs.angle,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.bond += rhs.bond;
        self.angle += rhs.angle;
    }
}

impl Sub for EnergyTerm {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond - rhs.bond,
            angle: self.angle - rhs.angle,
        }
    }
}
