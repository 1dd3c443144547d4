//! Real scalar bounds for the SO(3) kernels.

use crate::element::Element;

/// Floating-point scalar usable by the SO(3) kernels.
///
/// Unlike a blanket bound, `Real` is implemented per type so each precision
/// carries its own numeric thresholds.
pub trait Real: Element + num_traits::Float {
    /// Rotation angle below which `sin θ / θ` and `(1 - cos θ) / θ²` switch to
    /// their Taylor series.
    const SMALL_ANGLE: Self;

    /// Default tolerance for orthonormality checks (`|RᵀR - I|`, `|det R - 1|`).
    const TOLERANCE: Self;

    /// Convert an `f64` literal into this precision.
    fn constant(value: f64) -> Self;
}

impl Real for f64 {
    const SMALL_ANGLE: f64 = 1e-4;
    const TOLERANCE: f64 = 1e-12;

    #[inline(always)]
    fn constant(value: f64) -> f64 {
        value
    }
}

impl Real for f32 {
    const SMALL_ANGLE: f32 = 1e-2;
    const TOLERANCE: f32 = 1e-5;

    #[inline(always)]
    fn constant(value: f64) -> f32 {
        value as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_real<T: Real>() {}

    #[test]
    fn test_standard_types() {
        assert_real::<f32>();
        assert_real::<f64>();
    }

    #[test]
    fn test_small_angle_taylor_error_is_below_tolerance() {
        // The first dropped term of cos θ is θ⁶/720.
        let t = f64::SMALL_ANGLE;
        assert!(t.powi(6) / 720.0 < f64::EPSILON);
        let t = f32::SMALL_ANGLE;
        assert!(t.powi(6) / 720.0 < f32::EPSILON);
    }

    #[test]
    fn test_constant_roundtrip() {
        assert_eq!(f64::constant(0.5), 0.5);
        assert_eq!(f32::constant(1.5), 1.5f32);
    }
}
