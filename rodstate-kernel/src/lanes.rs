//! Validated lane access and splitting at a common batch index.

use rodstate_traits::{
    MatrixBatchMut, Result, Size, StateError, VectorBatch, MATRIX_LANES, VECTOR_LANES,
};

/// Borrow the lanes of a matrix batch and an increment batch of equal length.
///
/// Lengths are compared first, then shapes. Nothing is written.
pub(crate) fn update_lanes<'m, 'v, T, M, V>(
    matrices: &'m mut M,
    increments: &'v V,
) -> Result<([&'m mut [T]; MATRIX_LANES], [&'v [T]; VECTOR_LANES])>
where
    M: MatrixBatchMut<T> + ?Sized,
    V: VectorBatch<T> + ?Sized,
{
    let n = matrices.size_backend();
    let m = increments.size_backend();
    if n != m {
        return Err(StateError::SizeMismatch {
            expected: n,
            actual: m,
        });
    }
    let increments = increments.vector_lanes()?;
    let matrices = matrices.matrix_lanes_mut()?;
    Ok((matrices, increments))
}

pub(crate) fn split_lanes<'a, T, const K: usize>(
    lanes: [&'a [T]; K],
    mid: usize,
) -> ([&'a [T]; K], [&'a [T]; K]) {
    (lanes.map(|l| &l[..mid]), lanes.map(|l| &l[mid..]))
}

pub(crate) fn split_lanes_mut<'a, T, const K: usize>(
    lanes: [&'a mut [T]; K],
    mid: usize,
) -> ([&'a mut [T]; K], [&'a mut [T]; K]) {
    let mut heads: [&'a mut [T]; K] = std::array::from_fn(|_| <&mut [T]>::default());
    let mut tails: [&'a mut [T]; K] = std::array::from_fn(|_| <&mut [T]>::default());
    for (i, lane) in lanes.into_iter().enumerate() {
        let (head, tail) = lane.split_at_mut(mid);
        heads[i] = head;
        tails[i] = tail;
    }
    (heads, tails)
}

/// Debug-only check that every matrix and increment lane has one length.
#[inline]
pub(crate) fn debug_assert_uniform<T>(
    matrices: &[&mut [T]; MATRIX_LANES],
    increments: &[&[T]; VECTOR_LANES],
) {
    let n = batch_len(increments);
    debug_assert!(
        matrices
            .iter()
            .map(|l| l.len())
            .chain(increments.iter().map(|l| l.len()))
            .all(|len| len == n),
        "matrix and increment lanes must all have the same length"
    );
}

/// Batch length of a set of lanes (0 when there are none).
#[inline]
pub(crate) fn batch_len<T, const K: usize>(lanes: &[&[T]; K]) -> usize {
    lanes.first().map_or(0, |l| l.len())
}
