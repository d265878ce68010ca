use crate::core::geometry::boundary::Boundary;
use nalgebra::{Matrix3, Vector3};

#[inline]
fn clamp_cosine(cos: f64) -> f64 {
    cos.clamp(-1.0, 1.0)
}

/// Harmonic bond energy `0.5 k (r - l0)²`; pass `rest_length = 0` for the
/// ideal spring.
#[inline]
pub fn harmonic_bond(dist: f64, k: f64, rest_length: f64) -> f64 {
    let stretch = dist - rest_length;
    0.5 * k * stretch * stretch
}

/// Bending energy `k (1 - cos θ)`, zero for a straight triple.
#[inline]
pub fn cosine_angle(cos_theta: f64, k: f64) -> f64 {
    k * (1.0 - clamp_cosine(cos_theta))
}

#[inline]
pub fn bond_energy(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    k: f64,
    rest_length: f64,
    boundary: &Boundary,
) -> f64 {
    if rest_length == 0.0 {
        return 0.5 * k * boundary.squared_distance(a, b);
    }
    harmonic_bond(boundary.distance(a, b), k, rest_length)
}

#[inline]
pub fn angle_energy(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    c: &Vector3<f64>,
    k: f64,
    boundary: &Boundary,
) -> f64 {
    cosine_angle(boundary.cos_angle(a, b, c), k)
}

/// Virial tensor of one bond: the spring force on `b` outer the separation
/// `b - a`.
#[inline]
pub fn bond_virial(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    k: f64,
    rest_length: f64,
    boundary: &Boundary,
) -> Matrix3<f64> {
    let sep = boundary.separation(a, b);
    let force = if rest_length == 0.0 {
        sep * k
    } else {
        let r = sep.norm();
        sep * (k * (1.0 - rest_length / r))
    };
    force * sep.transpose()
}

/// Virial tensor of one bending triple with vertex `b`.
///
/// The energy gradient is taken along each leg (`a - b` and `c - b`) and the
/// per-leg contributions are combined as outer products with the leg vectors.
pub fn angle_virial(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    c: &Vector3<f64>,
    k: f64,
    boundary: &Boundary,
) -> Matrix3<f64> {
    let dr10 = boundary.separation(b, a);
    let dr12 = boundary.separation(b, c);
    let n10_sq = dr10.norm_squared();
    let n12_sq = dr12.norm_squared();
    let n10 = n10_sq.sqrt();
    let n12 = n12_sq.sqrt();

    let cos = clamp_cosine(dr10.dot(&dr12) / (n10 * n12));
    let a11 = k * cos / n10_sq;
    let a12 = -k / (n10 * n12);
    let a22 = k * cos / n12_sq;

    let d_f0 = dr10 * a11 + dr12 * a12;
    let d_f1 = dr12 * a22 + dr10 * a12;

    d_f0 * dr10.transpose() + d_f1 * dr12.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn harmonic_bond_is_zero_at_rest_length() {
        assert!(f64_approx_equal(harmonic_bond(1.5, 4.0, 1.5), 0.0));
    }

    #[test]
    fn harmonic_bond_is_symmetric_about_rest_length() {
        let stretched = harmonic_bond(1.2, 3.0, 1.0);
        let compressed = harmonic_bond(0.8, 3.0, 1.0);
        assert!(f64_approx_equal(stretched, compressed));
        assert!(f64_approx_equal(stretched, 0.5 * 3.0 * 0.04));
    }

    #[test]
    fn ideal_bond_energy_uses_squared_distance() {
        let boundary = Boundary::free();
        let e = bond_energy(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 2.0, 2.0),
            2.0,
            0.0,
            &boundary,
        );
        assert!(f64_approx_equal(e, 9.0));
    }

    #[test]
    fn finite_bond_energy_is_zero_at_rest_length() {
        let boundary = Boundary::free();
        let e = bond_energy(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(0.0, 3.0, 4.0),
            10.0,
            5.0,
            &boundary,
        );
        assert!(f64_approx_equal(e, 0.0));
    }

    #[test]
    fn bond_energy_is_never_negative() {
        let boundary = Boundary::periodic(Vector3::new(5.0, 5.0, 5.0)).unwrap();
        let points = [
            Vector3::new(0.1, 0.2, 0.3),
            Vector3::new(4.9, 2.5, 0.0),
            Vector3::new(2.4, 4.4, 3.3),
        ];
        for a in &points {
            for b in &points {
                assert!(bond_energy(a, b, 1.0, 0.0, &boundary) >= 0.0);
                assert!(bond_energy(a, b, 1.0, 1.0, &boundary) >= 0.0);
            }
        }
    }

    #[test]
    fn straight_triple_has_zero_bending_energy() {
        let boundary = Boundary::free();
        let e = angle_energy(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(2.0, 0.0, 0.0),
            5.0,
            &boundary,
        );
        assert!(f64_approx_equal(e, 0.0));
    }

    #[test]
    fn folded_triple_has_maximal_bending_energy() {
        let boundary = Boundary::free();
        let e = angle_energy(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 0.0),
            5.0,
            &boundary,
        );
        assert!(f64_approx_equal(e, 10.0));
    }

    #[test]
    fn cosine_angle_clamps_rounding_overshoot() {
        assert!(f64_approx_equal(cosine_angle(1.0 + 1e-12, 3.0), 0.0));
        assert!(f64_approx_equal(cosine_angle(-1.0 - 1e-12, 3.0), 6.0));
    }

    #[test]
    fn ideal_bond_virial_is_outer_product_of_separation() {
        let boundary = Boundary::free();
        let virial = bond_virial(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 2.0, 0.0),
            3.0,
            0.0,
            &boundary,
        );
        assert!(f64_approx_equal(virial[(0, 0)], 3.0));
        assert!(f64_approx_equal(virial[(0, 1)], 6.0));
        assert!(f64_approx_equal(virial[(1, 1)], 12.0));
        assert!(f64_approx_equal(virial[(2, 2)], 0.0));
    }

    #[test]
    fn finite_bond_virial_vanishes_at_rest_length() {
        let boundary = Boundary::free();
        let virial = bond_virial(
            &Vector3::new(1.0, 1.0, 1.0),
            &Vector3::new(1.0, 1.0, 3.0),
            7.0,
            2.0,
            &boundary,
        );
        assert!(virial.iter().all(|v| f64_approx_equal(*v, 0.0)));
    }

    #[test]
    fn bond_virial_uses_minimum_image() {
        let boundary = Boundary::periodic(Vector3::new(10.0, 10.0, 10.0)).unwrap();
        let virial = bond_virial(
            &Vector3::new(9.5, 0.0, 0.0),
            &Vector3::new(0.5, 0.0, 0.0),
            1.0,
            0.0,
            &boundary,
        );
        assert!(f64_approx_equal(virial[(0, 0)], 1.0));
    }

    #[test]
    fn straight_angle_virial_trace_is_zero() {
        // Leg gradients cancel for a straight triple.
        let boundary = Boundary::free();
        let virial = angle_virial(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(2.0, 0.0, 0.0),
            4.0,
            &boundary,
        );
        assert!(f64_approx_equal(virial.trace(), 0.0));
    }

    #[test]
    fn right_angle_virial_matches_hand_computation() {
        let boundary = Boundary::free();
        let virial = angle_virial(
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
            2.0,
            &boundary,
        );
        // cos = 0, so only the cross term a12 = -k survives.
        assert!(f64_approx_equal(virial[(0, 1)], -2.0));
        assert!(f64_approx_equal(virial[(1, 0)], -2.0));
        assert!(f64_approx_equal(virial[(0, 0)], 0.0));
        assert!(f64_approx_equal(virial[(1, 1)], 0.0));
    }
}
