//! Public SO(3) batch operations.

use rodstate_traits::{
    MatrixBatch, MatrixBatchMut, Real, Resize, Result, Size, StateError, VectorBatch,
    VectorBatchMut,
};

use crate::backend::{So3AddAssign, So3AddAssignKernel};
use crate::so3;

/// Compute `dest[k] = orthonormalize(exp(-[v_k]x) · base[k])` for every `k`.
///
/// `dest` is resized to the batch length first when it differs. The result
/// never depends on the previous contents of `dest`.
///
/// # Errors
/// - [`StateError::SizeMismatch`] when `base` and `increments` differ in
///   length
/// - a shape error from any of the three containers
///
/// All checks run before `dest` is resized or written.
pub fn so3_assign<T, D, B, V>(dest: &mut D, base: &B, increments: &V) -> Result<()>
where
    T: Real,
    D: MatrixBatchMut<T> + Resize + ?Sized,
    B: MatrixBatch<T> + ?Sized,
    V: VectorBatch<T> + ?Sized,
{
    let n = base.size_backend();
    let m = increments.size_backend();
    if n != m {
        return Err(StateError::SizeMismatch {
            expected: n,
            actual: m,
        });
    }
    let base = base.matrix_lanes()?;
    let increments = increments.vector_lanes()?;
    dest.matrix_lanes()?;
    if dest.size_backend() != n {
        dest.resize_backend(n);
    }
    let mut out = dest.matrix_lanes_mut()?;
    for (lane, src) in out.iter_mut().zip(base) {
        lane.copy_from_slice(src);
    }
    tracing::trace!(n, "so3 assign");
    So3AddAssign::apply_lanes(out, increments);
    Ok(())
}

/// Update `matrices[k] ← orthonormalize(exp(-[v_k]x) · matrices[k])` in place
/// through the backend fixed at compile time.
///
/// # Errors
/// [`StateError::SizeMismatch`] when the lengths differ; no resizing occurs.
pub fn so3_add_assign<T, M, V>(matrices: &mut M, increments: &V) -> Result<()>
where
    T: Real,
    M: MatrixBatchMut<T> + ?Sized,
    V: VectorBatch<T> + ?Sized,
{
    So3AddAssign::apply(matrices, increments)
}

/// [`so3_add_assign`] through an explicitly chosen kernel.
pub fn so3_add_assign_with<K, T, M, V>(matrices: &mut M, increments: &V) -> Result<()>
where
    K: So3AddAssignKernel,
    T: Real,
    M: MatrixBatchMut<T> + ?Sized,
    V: VectorBatch<T> + ?Sized,
{
    K::apply(matrices, increments)
}

/// [`so3_add_assign`] with disjoint index ranges on the rayon pool.
#[cfg(feature = "parallel")]
pub fn so3_add_assign_par<T, M, V>(matrices: &mut M, increments: &V) -> Result<()>
where
    T: Real,
    M: MatrixBatchMut<T> + ?Sized,
    V: VectorBatch<T> + ?Sized,
{
    use rodstate_traits::{MATRIX_LANES, VECTOR_LANES};

    let (lanes, increments) = crate::lanes::update_lanes(matrices, increments)?;
    tracing::trace!(n = increments[0].len(), "so3 add-assign (parallel)");
    crate::threading::for_each_range(
        lanes,
        increments,
        &|m: [&mut [T]; MATRIX_LANES], v: [&[T]; VECTOR_LANES]| So3AddAssign::apply_lanes(m, v),
    );
    Ok(())
}

/// Recover the increments between consecutive frames.
///
/// Writes `n - 1` vectors with `frames[k + 1] = exp(-[v_k]x) · frames[k]`,
/// resizing `dest` as needed. Rotation angles must stay below π.
pub fn so3_inv_rotate<T, D, F>(dest: &mut D, frames: &F) -> Result<()>
where
    T: Real,
    D: VectorBatchMut<T> + Resize + ?Sized,
    F: MatrixBatch<T> + ?Sized,
{
    let q = frames.matrix_lanes()?;
    let count = frames.size_backend().saturating_sub(1);
    dest.vector_lanes()?;
    if dest.size_backend() != count {
        dest.resize_backend(count);
    }
    let mut out = dest.vector_lanes_mut()?;
    tracing::trace!(n = count, "so3 inverse rotate");
    for k in 0..count {
        let from: so3::Mat3<T> = std::array::from_fn(|i| q[i][k]);
        let to: so3::Mat3<T> = std::array::from_fn(|i| q[i][k + 1]);
        let v = so3::log_between(&from, &to);
        for (lane, value) in out.iter_mut().zip(v) {
            lane[k] = value;
        }
    }
    Ok(())
}

/// Overwrite every element of a matrix batch with the identity.
pub fn fill_identity<T, M>(matrices: &mut M) -> Result<()>
where
    T: Real,
    M: MatrixBatchMut<T> + ?Sized,
{
    let eye = so3::identity::<T>();
    for (lane, value) in matrices.matrix_lanes_mut()?.into_iter().zip(eye) {
        lane.fill(value);
    }
    Ok(())
}

/// Largest orthonormality defect over the batch (`0` when empty).
///
/// Per element this is `max(max|RᵀR - I|, |det R - 1|)`.
pub fn max_orthonormality_error<T, M>(matrices: &M) -> Result<T>
where
    T: Real,
    M: MatrixBatch<T> + ?Sized,
{
    let lanes = matrices.matrix_lanes()?;
    let n = matrices.size_backend();
    Ok((0..n).fold(T::zero(), |acc, k| {
        let m: so3::Mat3<T> = std::array::from_fn(|i| lanes[i][k]);
        so3::worst(acc, so3::orthonormality_error(&m))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ScalarKernel, SimdKernel};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rand_distr::StandardNormal;
    use rodstate_view::{ArrayViewMut, Matrix, Tensor};

    fn identities(n: usize) -> Tensor<f64> {
        let mut t = Tensor::zeros([3, 3, n]);
        fill_identity(&mut t).unwrap();
        t
    }

    fn random_increments(rng: &mut StdRng, n: usize, scale: f64) -> Matrix<f64> {
        Matrix::from_fn([3, n], |_| scale * rng.sample::<f64, _>(StandardNormal))
    }

    #[test]
    fn test_assign_resizes_destination() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = identities(6);
        let inc = random_increments(&mut rng, 6, 0.5);
        let mut dest = Tensor::<f64>::zeros([3, 3, 2]);
        so3_assign(&mut dest, &base, &inc).unwrap();
        assert_eq!(dest.dims(), &[3, 3, 6]);
        assert!(max_orthonormality_error(&dest).unwrap() < 1e-12);
    }

    #[test]
    fn test_assign_matches_add_assign_on_copy() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut base = identities(9);
        let warmup = random_increments(&mut rng, 9, 1.0);
        so3_add_assign(&mut base, &warmup).unwrap();
        let inc = random_increments(&mut rng, 9, 0.3);

        let mut assigned = Tensor::<f64>::zeros([3, 3, 0]);
        so3_assign(&mut assigned, &base, &inc).unwrap();
        let mut updated = base.clone();
        so3_add_assign(&mut updated, &inc).unwrap();
        assert_eq!(assigned, updated);
    }

    #[test]
    fn test_assign_rejects_mismatch_without_touching_dest() {
        let base = identities(3);
        let inc = Matrix::<f64>::zeros([3, 4]);
        let mut dest = Tensor::<f64>::filled([3, 3, 2], 5.0);
        let err = so3_assign(&mut dest, &base, &inc).unwrap_err();
        assert_eq!(
            err,
            StateError::SizeMismatch {
                expected: 3,
                actual: 4
            }
        );
        assert_eq!(dest, Tensor::filled([3, 3, 2], 5.0));
    }

    #[test]
    fn test_assign_rejects_bad_destination_shape_before_resize() {
        let base = identities(3);
        let inc = Matrix::<f64>::zeros([3, 3]);
        let mut dest = Tensor::<f64>::zeros([2, 3, 1]);
        assert!(matches!(
            so3_assign(&mut dest, &base, &inc),
            Err(StateError::ShapeMismatch(..))
        ));
        assert_eq!(dest.dims(), &[2, 3, 1]);
    }

    #[test]
    fn test_backends_agree_on_ragged_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 4 * 5 + 3;
        let inc = random_increments(&mut rng, n, 1.5);
        let mut scalar = identities(n);
        let mut simd = identities(n);
        for _ in 0..5 {
            so3_add_assign_with::<ScalarKernel, _, _, _>(&mut scalar, &inc).unwrap();
            so3_add_assign_with::<SimdKernel, _, _, _>(&mut simd, &inc).unwrap();
        }
        for (a, b) in scalar.iter().zip(simd.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_inv_rotate_recovers_increments() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 8;
        let inc = random_increments(&mut rng, n - 1, 0.4);
        let mut frames = identities(n);
        // frames[k + 1] = exp(-[v_k]x) frames[k]
        for k in 0..n - 1 {
            let q: so3::Mat3<f64> =
                std::array::from_fn(|i| frames.get([i / 3, i % 3, k]).unwrap());
            let v = std::array::from_fn(|c| inc.get([c, k]).unwrap());
            let next = so3::step(&q, v);
            for i in 0..9 {
                frames.set([i / 3, i % 3, k + 1], next[i]).unwrap();
            }
        }
        let mut out = Matrix::<f64>::zeros([3, 0]);
        so3_inv_rotate(&mut out, &frames).unwrap();
        assert_eq!(out.dims(), &[3, n - 1]);
        for (a, b) in out.iter().zip(inc.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_huge_increments_stay_on_manifold() {
        let n = 4 + 1;
        let inc = Matrix::from_fn([3, n], |[c, k]| match (c, k % 3) {
            (0, 0) => 1e200,
            (1, 1) => -4e180,
            (2, _) => 3e154,
            _ => 0.0,
        });
        let mut scalar = identities(n);
        let mut simd = identities(n);
        so3_add_assign_with::<ScalarKernel, _, _, _>(&mut scalar, &inc).unwrap();
        so3_add_assign_with::<SimdKernel, _, _, _>(&mut simd, &inc).unwrap();
        assert!(scalar.iter().all(|x| x.is_finite()));
        for (a, b) in scalar.iter().zip(simd.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-13);
        }
        assert!(max_orthonormality_error(&scalar).unwrap() < f64::TOLERANCE);
    }

    #[test]
    fn test_orthonormality_error_reports_nan_frames() {
        let all_nan = Tensor::<f64>::filled([3, 3, 2], f64::NAN);
        assert_eq!(max_orthonormality_error(&all_nan).unwrap(), f64::INFINITY);

        let mut one_bad = identities(6);
        one_bad.set([1, 2, 3], f64::NAN).unwrap();
        assert_eq!(max_orthonormality_error(&one_bad).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_transposed_view_updates_like_contiguous() {
        let mut rng = StdRng::seed_from_u64(17);
        let n = 4 * 2 + 1;
        let inc = random_increments(&mut rng, n, 0.7);
        let mut dense = identities(n);
        so3_add_assign(&mut dense, &inc).unwrap();

        // element (r, c, k) stored at 3 n c + n r + k
        let mut data = vec![0.0f64; 9 * n];
        {
            let strides = [n as isize, 3 * n as isize, 1];
            let mut view = ArrayViewMut::new(&mut data, [3, 3, n], strides, 0).unwrap();
            fill_identity(&mut view).unwrap();
            so3_add_assign(&mut view, &inc).unwrap();
            assert!(max_orthonormality_error(&view).unwrap() < 1e-12);
        }
        for r in 0..3 {
            for c in 0..3 {
                for k in 0..n {
                    assert_eq!(data[3 * n * c + n * r + k], dense.get([r, c, k]).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_inv_rotate_of_empty_batch() {
        let frames = Tensor::<f64>::zeros([3, 3, 0]);
        let mut out = Matrix::<f64>::zeros([3, 2]);
        so3_inv_rotate(&mut out, &frames).unwrap();
        assert_eq!(out.dims(), &[3, 0]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let mut rng = StdRng::seed_from_u64(13);
        let n = 3 * crate::MIN_PARALLEL_LEN + 1;
        let inc = random_increments(&mut rng, n, 0.8);
        let mut serial = identities(n);
        let mut par = identities(n);
        so3_add_assign(&mut serial, &inc).unwrap();
        so3_add_assign_par(&mut par, &inc).unwrap();
        assert_eq!(serial, par);
    }
}
