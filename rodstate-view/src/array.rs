//! Owned dense arrays.
//!
//! [`DenseArray`] owns a row-major `Vec<T>` with const-generic rank. The last
//! axis is the batch axis: for a [`Tensor`] of shape `[3, 3, n]` each of the
//! nine leading index pairs owns one contiguous lane of length `n`, which is
//! exactly the structure-of-arrays layout the SO(3) kernels consume.

use std::fmt;

use rodstate_traits::{
    Element, MatrixBatch, MatrixBatchMut, Resize, Result, Size, StateError, VectorBatch,
    VectorBatchMut, MATRIX_LANES, VECTOR_LANES,
};

use crate::buffer::{decode, BufferInfo, RawBuffer};
use crate::fmt::write_nested;
use crate::view::{
    element_count, lane_offsets, lanes, lanes_mut, row_major_strides, unravel, ArrayView,
    ArrayViewMut,
};

/// Owned dense array with row-major storage.
#[derive(Clone, PartialEq)]
pub struct DenseArray<T, const N: usize> {
    data: Vec<T>,
    dims: [usize; N],
}

/// One-dimensional array.
pub type Vector<T> = DenseArray<T, 1>;

/// Vector of indices into another batch.
pub type IndexVector = Vector<usize>;

/// Two-dimensional array; `[3, n]` holds a batch of 3-vectors.
pub type Matrix<T> = DenseArray<T, 2>;

/// Three-dimensional array; `[3, 3, n]` holds a batch of 3×3 matrices.
pub type Tensor<T> = DenseArray<T, 3>;

/// Element count of a shape about to be allocated.
fn checked_total(dims: &[usize]) -> usize {
    match element_count(dims) {
        Ok(total) => total,
        Err(_) => panic!("shape {dims:?} overflows usize"),
    }
}

impl<T: Element, const N: usize> DenseArray<T, N> {
    /// Array of zeros (the element's default value).
    pub fn zeros(dims: [usize; N]) -> Self {
        Self::filled(dims, T::default())
    }

    /// Array with every element set to `value`.
    ///
    /// # Panics
    /// When the number of elements in `dims` overflows `usize`.
    pub fn filled(dims: [usize; N], value: T) -> Self {
        let total = checked_total(&dims);
        Self {
            data: vec![value; total],
            dims,
        }
    }

    /// Build from a function of the multi-index, in row-major order.
    ///
    /// # Panics
    /// When the number of elements in `dims` overflows `usize`.
    pub fn from_fn(dims: [usize; N], mut f: impl FnMut([usize; N]) -> T) -> Self {
        let total = checked_total(&dims);
        let data = (0..total).map(|flat| f(unravel(flat, &dims))).collect();
        Self { data, dims }
    }

    /// Import a raw host buffer.
    ///
    /// # Errors
    /// - [`StateError::IncompatibleFormat`] when the format tag is not `T`'s
    /// - [`StateError::IncompatibleDimension`] when the rank is not `N`
    /// - [`StateError::BufferLength`] when the bytes do not cover the shape
    pub fn from_buffer(buffer: &RawBuffer<'_>) -> Result<Self> {
        let (dims, data) = decode::<T, N>(buffer)?;
        Ok(Self { data, dims })
    }

    /// Describe the owned memory for export.
    pub fn buffer_info(&self) -> BufferInfo {
        BufferInfo::describe::<T>(&self.dims, &self.strides())
    }

    /// The storage as raw bytes, in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T, const N: usize> DenseArray<T, N> {
    /// Take ownership of row-major data.
    ///
    /// # Errors
    /// [`StateError::OffsetOverflow`] when the shape's element count overflows,
    /// [`StateError::SizeMismatch`] when `data` does not match it.
    pub fn from_vec(dims: [usize; N], data: Vec<T>) -> Result<Self> {
        let expected = element_count(&dims)?;
        if data.len() != expected {
            return Err(StateError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, dims })
    }

    #[inline]
    pub fn dims(&self) -> &[usize; N] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> [isize; N] {
        row_major_strides(&self.dims)
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow the whole array as a strided view.
    pub fn view(&self) -> ArrayView<'_, T, N> {
        ArrayView::contiguous(&self.data, self.dims)
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T, N> {
        ArrayViewMut::contiguous(&mut self.data, self.dims)
    }

    fn flat_index(&self, index: &[usize; N]) -> Result<usize> {
        let mut flat = 0usize;
        for d in 0..N {
            if index[d] >= self.dims[d] {
                return Err(StateError::IndexOutOfRange {
                    index: index.to_vec(),
                    shape: self.dims.to_vec(),
                });
            }
            flat = flat * self.dims[d] + index[d];
        }
        Ok(flat)
    }
}

impl<T: Copy, const N: usize> DenseArray<T, N> {
    /// Bounds-checked element read.
    pub fn get(&self, index: [usize; N]) -> Result<T> {
        Ok(self.data[self.flat_index(&index)?])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, index: [usize; N], value: T) -> Result<()> {
        let flat = self.flat_index(&index)?;
        self.data[flat] = value;
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data.iter().copied()
    }
}

impl<T: Element> Vector<T> {
    pub fn from_slice(values: &[T]) -> Self {
        Self {
            data: values.to_vec(),
            dims: [values.len()],
        }
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        let dims = [data.len()];
        Self { data, dims }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for DenseArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseArray")
            .field("dims", &self.dims)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: fmt::Display, const N: usize> fmt::Display for DenseArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nested(f, &self.dims, &self.data)
    }
}

// ============================================================================
// Batch access
// ============================================================================

impl<T, const N: usize> Size for DenseArray<T, N> {
    #[inline]
    fn size_backend(&self) -> usize {
        self.dims.last().copied().unwrap_or(0)
    }
}

impl<T: Element, const N: usize> Resize for DenseArray<T, N> {
    /// Resize the batch (last) axis, keeping the common prefix of every lane.
    fn resize_backend(&mut self, new_count: usize) {
        let Some(&old_count) = self.dims.last() else {
            return;
        };
        if old_count == new_count {
            return;
        }
        let mut dims = self.dims;
        dims[N - 1] = new_count;
        let total = checked_total(&dims);
        let lead: usize = self.dims[..N - 1].iter().product();
        let data = if old_count == 0 {
            vec![T::default(); total]
        } else {
            let keep = old_count.min(new_count);
            let mut data = Vec::with_capacity(total);
            for lane in self.data.chunks_exact(old_count) {
                data.extend_from_slice(&lane[..keep]);
                data.resize(data.len() + (new_count - keep), T::default());
            }
            data
        };
        self.data = data;
        self.dims[N - 1] = new_count;
        tracing::debug!(
            from = old_count,
            to = new_count,
            lanes = lead,
            "resized batch axis"
        );
    }
}

impl<T> MatrixBatch<T> for Tensor<T> {
    fn matrix_lanes(&self) -> Result<[&[T]; MATRIX_LANES]> {
        let offsets = lane_offsets::<MATRIX_LANES>(&self.dims, &self.strides(), 0, &[3, 3])?;
        lanes(&self.data, offsets, self.dims[2], 1)
    }
}

impl<T> MatrixBatchMut<T> for Tensor<T> {
    fn matrix_lanes_mut(&mut self) -> Result<[&mut [T]; MATRIX_LANES]> {
        let offsets = lane_offsets::<MATRIX_LANES>(&self.dims, &self.strides(), 0, &[3, 3])?;
        lanes_mut(&mut self.data, offsets, self.dims[2], 1)
    }
}

impl<T> VectorBatch<T> for Matrix<T> {
    fn vector_lanes(&self) -> Result<[&[T]; VECTOR_LANES]> {
        let offsets = lane_offsets::<VECTOR_LANES>(&self.dims, &self.strides(), 0, &[3])?;
        lanes(&self.data, offsets, self.dims[1], 1)
    }
}

impl<T> VectorBatchMut<T> for Matrix<T> {
    fn vector_lanes_mut(&mut self) -> Result<[&mut [T]; VECTOR_LANES]> {
        let offsets = lane_offsets::<VECTOR_LANES>(&self.dims, &self.strides(), 0, &[3])?;
        lanes_mut(&mut self.data, offsets, self.dims[1], 1)
    }
}
