//! Container introspection for batched state.
//!
//! Kernels never name a concrete storage type. They query and change the
//! element count through [`Size`] / [`Resize`] and read or write the batch
//! through per-component lanes ([`MatrixBatch`], [`VectorBatch`]).
//!
//! A lane is the contiguous run of one matrix (or vector) component across
//! the whole batch: lane `3*r + c` of a matrix batch holds entry `(r, c)` of
//! every element, lane `c` of a vector batch holds component `c`.

use crate::Result;

/// Number of lanes in a 3×3 matrix batch.
pub const MATRIX_LANES: usize = 9;

/// Number of lanes in a 3-vector batch.
pub const VECTOR_LANES: usize = 3;

/// Number of top-level elements (batch length) held by a container.
pub trait Size {
    /// Returns the batch length. Must be O(1) and side-effect free.
    fn size_backend(&self) -> usize;
}

/// Containers whose batch length can change.
///
/// Growing keeps the values at `[0, old)`; elements at `[old, new)` are
/// unspecified and must be written before they are read. Shrinking discards
/// `[new, old)`.
pub trait Resize: Size {
    fn resize_backend(&mut self, new_count: usize);
}

/// Returns the batch length of any sized container.
#[inline]
pub fn size_backend<C: Size + ?Sized>(container: &C) -> usize {
    container.size_backend()
}

/// Changes the batch length of any resizable container.
#[inline]
pub fn resize_backend<C: Resize + ?Sized>(container: &mut C, new_count: usize) {
    container.resize_backend(new_count)
}

/// Read access to a batch of 3×3 matrices as nine component lanes.
pub trait MatrixBatch<T>: Size {
    /// Returns the nine lanes, each of length [`Size::size_backend`].
    ///
    /// # Errors
    /// Fails when the container does not hold 3×3 elements or its batch
    /// axis is not contiguous.
    fn matrix_lanes(&self) -> Result<[&[T]; MATRIX_LANES]>;
}

/// Write access to a batch of 3×3 matrices.
pub trait MatrixBatchMut<T>: MatrixBatch<T> {
    fn matrix_lanes_mut(&mut self) -> Result<[&mut [T]; MATRIX_LANES]>;
}

/// Read access to a batch of 3-vectors as three component lanes.
pub trait VectorBatch<T>: Size {
    fn vector_lanes(&self) -> Result<[&[T]; VECTOR_LANES]>;
}

/// Write access to a batch of 3-vectors.
pub trait VectorBatchMut<T>: VectorBatch<T> {
    fn vector_lanes_mut(&mut self) -> Result<[&mut [T]; VECTOR_LANES]>;
}

impl<T> Size for Vec<T> {
    #[inline]
    fn size_backend(&self) -> usize {
        self.len()
    }
}

impl<T: Clone + Default> Resize for Vec<T> {
    fn resize_backend(&mut self, new_count: usize) {
        self.resize(new_count, T::default());
    }
}

impl<T> Size for [T] {
    #[inline]
    fn size_backend(&self) -> usize {
        self.len()
    }
}

impl<C: Size + ?Sized> Size for &C {
    #[inline]
    fn size_backend(&self) -> usize {
        (**self).size_backend()
    }
}

impl<C: Size + ?Sized> Size for &mut C {
    #[inline]
    fn size_backend(&self) -> usize {
        (**self).size_backend()
    }
}

impl<C: Resize + ?Sized> Resize for &mut C {
    fn resize_backend(&mut self, new_count: usize) {
        (**self).resize_backend(new_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_size_and_resize() {
        let mut v = vec![1.0f64, 2.0, 3.0];
        assert_eq!(size_backend(&v), 3);
        resize_backend(&mut v, 5);
        assert_eq!(size_backend(&v), 5);
        resize_backend(&mut v, 3);
        assert_eq!(v, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_shrink_discards_tail() {
        let mut v: Vec<usize> = (0..10).collect();
        resize_backend(&mut v, 4);
        assert_eq!(v, vec![0, 1, 2, 3]);
        resize_backend(&mut v, 0);
        assert_eq!(size_backend(&v), 0);
    }

    #[test]
    fn test_size_through_references() {
        let v = vec![0u32; 7];
        let r = &v;
        assert_eq!(size_backend(&r), 7);
        assert_eq!(size_backend(v.as_slice()), 7);
    }
}
