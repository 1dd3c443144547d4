//! Borrowed strided views over dense storage.
//!
//! [`ArrayView`] and [`ArrayViewMut`] are zero-copy windows into a slice with
//! const-generic rank. Slicing only rewrites dims/strides/offset, so a
//! sub-view of a matrix batch still writes through to the owning container.

use std::fmt;
use std::mem::size_of;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use rodstate_traits::{
    Element, MatrixBatch, MatrixBatchMut, Result, Size, StateError, VectorBatch, VectorBatchMut,
    MATRIX_LANES, VECTOR_LANES,
};

use crate::buffer::BufferInfo;
use crate::fmt::write_nested;

// ============================================================================
// Layout helpers
// ============================================================================

/// Compute row-major strides (C default: last index varies fastest).
pub fn row_major_strides<const N: usize>(dims: &[usize; N]) -> [isize; N] {
    let mut strides = [1isize; N];
    for i in (0..N.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

/// Number of elements covered by `dims`.
///
/// # Errors
/// [`StateError::OffsetOverflow`] when the count does not fit in `usize`.
pub(crate) fn element_count(dims: &[usize]) -> Result<usize> {
    if dims.contains(&0) {
        return Ok(0);
    }
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(StateError::OffsetOverflow)
}

/// Validate that all accessed offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: usize) -> Result<()> {
    // Empty array - no access needed
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset as isize;
    let mut max_offset = offset as isize;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StateError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(StateError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(StateError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset as usize >= len {
        return Err(StateError::OffsetOverflow);
    }
    Ok(())
}

fn check_index<const N: usize>(index: &[usize; N], dims: &[usize; N]) -> Result<()> {
    if index.iter().zip(dims.iter()).any(|(&i, &d)| i >= d) {
        return Err(StateError::IndexOutOfRange {
            index: index.to_vec(),
            shape: dims.to_vec(),
        });
    }
    Ok(())
}

#[inline]
fn linear_index<const N: usize>(index: &[usize; N], strides: &[isize; N], offset: usize) -> usize {
    let mut idx = offset as isize;
    for i in 0..N {
        idx += index[i] as isize * strides[i];
    }
    idx as usize
}

/// Multi-index of the `flat`-th element in row-major order.
pub(crate) fn unravel<const N: usize>(mut flat: usize, dims: &[usize; N]) -> [usize; N] {
    let mut index = [0usize; N];
    for d in (0..N).rev() {
        if dims[d] > 0 {
            index[d] = flat % dims[d];
            flat /= dims[d];
        }
    }
    index
}

// ============================================================================
// Batch lanes
// ============================================================================

/// Offsets of the `K` lanes spanned by the leading (non-batch) dims.
///
/// The leading dims must equal `expected` exactly.
pub(crate) fn lane_offsets<const K: usize>(
    dims: &[usize],
    strides: &[isize],
    offset: usize,
    expected: &[usize],
) -> Result<[usize; K]> {
    let lead = dims.len().saturating_sub(1);
    if dims.is_empty() || &dims[..lead] != expected {
        let mut want = expected.to_vec();
        want.push(dims.last().copied().unwrap_or(0));
        return Err(StateError::ShapeMismatch(want, dims.to_vec()));
    }
    let mut offsets = [0usize; K];
    for (k, slot) in offsets.iter_mut().enumerate() {
        let mut rem = k;
        let mut off = offset as isize;
        for d in (0..lead).rev() {
            off += (rem % dims[d]) as isize * strides[d];
            rem /= dims[d];
        }
        *slot = usize::try_from(off).map_err(|_| StateError::OffsetOverflow)?;
    }
    Ok(offsets)
}

fn check_batch_stride(n: usize, stride: isize) -> Result<()> {
    if n > 1 && stride != 1 {
        return Err(StateError::NonContiguousBatch { stride });
    }
    Ok(())
}

/// Borrow `K` lanes of length `n` starting at `offsets`.
pub(crate) fn lanes<'s, T, const K: usize>(
    data: &'s [T],
    offsets: [usize; K],
    n: usize,
    batch_stride: isize,
) -> Result<[&'s [T]; K]> {
    let mut out: [&'s [T]; K] = [<&[T]>::default(); K];
    if n == 0 {
        return Ok(out);
    }
    check_batch_stride(n, batch_stride)?;
    for (slot, &start) in out.iter_mut().zip(offsets.iter()) {
        *slot = data
            .get(start..start + n)
            .ok_or(StateError::OffsetOverflow)?;
    }
    Ok(out)
}

/// Mutably borrow `K` disjoint lanes of length `n` starting at `offsets`.
///
/// Offsets may come in any order. Lanes that share an element are rejected
/// with [`StateError::OverlappingLanes`].
pub(crate) fn lanes_mut<'s, T, const K: usize>(
    data: &'s mut [T],
    offsets: [usize; K],
    n: usize,
    batch_stride: isize,
) -> Result<[&'s mut [T]; K]> {
    let mut out: [&'s mut [T]; K] = std::array::from_fn(|_| <&mut [T]>::default());
    if n == 0 {
        return Ok(out);
    }
    check_batch_stride(n, batch_stride)?;
    let mut order: [usize; K] = std::array::from_fn(|i| i);
    order.sort_unstable_by_key(|&i| offsets[i]);
    let mut rest = data;
    let mut consumed = 0usize;
    for &i in order.iter() {
        let start = offsets[i];
        if start < consumed {
            return Err(StateError::OverlappingLanes);
        }
        let tail = std::mem::take(&mut rest);
        let skip = start - consumed;
        if tail.len() < skip || tail.len() - skip < n {
            return Err(StateError::OffsetOverflow);
        }
        let (_, tail) = tail.split_at_mut(skip);
        let (lane, tail) = tail.split_at_mut(n);
        out[i] = lane;
        rest = tail;
        consumed = start + n;
    }
    Ok(out)
}

// ============================================================================
// Slicing support
// ============================================================================

/// Types usable as a per-dimension slice argument.
pub trait SliceIndex {
    /// Resolve to `(start, end, step)` for a dimension of length `len`.
    fn bounds(&self, len: usize) -> (usize, usize, usize);
}

impl SliceIndex for RangeFull {
    fn bounds(&self, len: usize) -> (usize, usize, usize) {
        (0, len, 1)
    }
}

impl SliceIndex for Range<usize> {
    fn bounds(&self, _len: usize) -> (usize, usize, usize) {
        (self.start, self.end, 1)
    }
}

impl SliceIndex for RangeFrom<usize> {
    fn bounds(&self, len: usize) -> (usize, usize, usize) {
        (self.start, len, 1)
    }
}

impl SliceIndex for RangeTo<usize> {
    fn bounds(&self, _len: usize) -> (usize, usize, usize) {
        (0, self.end, 1)
    }
}

impl SliceIndex for RangeInclusive<usize> {
    fn bounds(&self, _len: usize) -> (usize, usize, usize) {
        (*self.start(), self.end().saturating_add(1), 1)
    }
}

impl SliceIndex for RangeToInclusive<usize> {
    fn bounds(&self, _len: usize) -> (usize, usize, usize) {
        (0, self.end.saturating_add(1), 1)
    }
}

/// A stepped range (`start..end` taking every `step`-th element).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl StepRange {
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        Self { start, end, step }
    }
}

impl SliceIndex for StepRange {
    fn bounds(&self, _len: usize) -> (usize, usize, usize) {
        (self.start, self.end, self.step)
    }
}

/// Apply resolved slice bounds to a layout.
fn slice_layout<const N: usize>(
    dims: &[usize; N],
    strides: &[isize; N],
    offset: usize,
    bounds: [(usize, usize, usize); N],
) -> Result<([usize; N], [isize; N], usize)> {
    let mut new_dims = [0usize; N];
    let mut new_strides = [0isize; N];
    let mut new_offset = offset as isize;
    for d in 0..N {
        let (start, end, step) = bounds[d];
        if step == 0 || start > end || end > dims[d] {
            return Err(StateError::InvalidSlice {
                start,
                end,
                step,
                len: dims[d],
            });
        }
        new_dims[d] = (end - start).div_ceil(step);
        new_strides[d] = strides[d] * step as isize;
        if new_dims[d] > 0 {
            new_offset += start as isize * strides[d];
        }
    }
    if new_dims.contains(&0) {
        new_offset = offset as isize;
    }
    Ok((new_dims, new_strides, new_offset as usize))
}

// ============================================================================
// ArrayView
// ============================================================================

/// An immutable strided view over borrowed data.
///
/// # Type Parameters
/// - `'a`: Lifetime of the underlying data
/// - `T`: Element type
/// - `N`: Number of dimensions (const generic)
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T, const N: usize> {
    data: &'a [T],
    dims: [usize; N],
    strides: [isize; N],
    offset: usize,
}

impl<'a, T, const N: usize> ArrayView<'a, T, N> {
    /// Create a new strided view.
    ///
    /// # Errors
    /// Returns an error if the view would access out-of-bounds memory.
    pub fn new(data: &'a [T], dims: [usize; N], strides: [isize; N], offset: usize) -> Result<Self> {
        validate_bounds(data.len(), &dims, &strides, offset)?;
        Ok(Self {
            data,
            dims,
            strides,
            offset,
        })
    }

    /// View a contiguous row-major slice.
    pub fn from_slice(data: &'a [T], dims: [usize; N]) -> Result<Self> {
        let expected = element_count(&dims)?;
        if data.len() != expected {
            return Err(StateError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            dims,
            strides: row_major_strides(&dims),
            offset: 0,
        })
    }

    /// Row-major view whose dims are known to cover `data` exactly.
    pub(crate) fn contiguous(data: &'a [T], dims: [usize; N]) -> Self {
        Self {
            data,
            dims,
            strides: row_major_strides(&dims),
            offset: 0,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize; N] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize; N] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Slice into a sub-view over the same memory.
    pub fn slice_dims(&self, bounds: [(usize, usize, usize); N]) -> Result<ArrayView<'a, T, N>> {
        let (dims, strides, offset) = slice_layout(&self.dims, &self.strides, self.offset, bounds)?;
        Ok(ArrayView {
            data: self.data,
            dims,
            strides,
            offset,
        })
    }
}

impl<'a, T: Copy, const N: usize> ArrayView<'a, T, N> {
    /// Bounds-checked element read.
    pub fn get(&self, index: [usize; N]) -> Result<T> {
        check_index(&index, &self.dims)?;
        Ok(self.data[linear_index(&index, &self.strides, self.offset)])
    }

    /// Iterate elements in row-major logical order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map(move |flat| {
            let index = unravel(flat, &self.dims);
            self.data[linear_index(&index, &self.strides, self.offset)]
        })
    }

    /// Copy the viewed elements into a row-major `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<'a, T: Element, const N: usize> ArrayView<'a, T, N> {
    /// Describe this view's memory with byte strides.
    pub fn buffer_info(&self) -> BufferInfo {
        BufferInfo::describe::<T>(&self.dims, &self.strides)
    }
}

impl<'a, T> ArrayView<'a, T, 1> {
    pub fn slice<I: SliceIndex>(&self, i0: I) -> Result<ArrayView<'a, T, 1>> {
        self.slice_dims([i0.bounds(self.dims[0])])
    }
}

impl<'a, T> ArrayView<'a, T, 2> {
    pub fn slice<I0: SliceIndex, I1: SliceIndex>(
        &self,
        i0: I0,
        i1: I1,
    ) -> Result<ArrayView<'a, T, 2>> {
        self.slice_dims([i0.bounds(self.dims[0]), i1.bounds(self.dims[1])])
    }
}

impl<'a, T> ArrayView<'a, T, 3> {
    pub fn slice<I0: SliceIndex, I1: SliceIndex, I2: SliceIndex>(
        &self,
        i0: I0,
        i1: I1,
        i2: I2,
    ) -> Result<ArrayView<'a, T, 3>> {
        self.slice_dims([
            i0.bounds(self.dims[0]),
            i1.bounds(self.dims[1]),
            i2.bounds(self.dims[2]),
        ])
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for ArrayView<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Copy + fmt::Display, const N: usize> fmt::Display for ArrayView<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nested(f, &self.dims, &self.to_vec())
    }
}

impl<T: Copy + PartialEq, const N: usize> PartialEq for ArrayView<'_, T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.iter().eq(other.iter())
    }
}

impl<T, const N: usize> Size for ArrayView<'_, T, N> {
    #[inline]
    fn size_backend(&self) -> usize {
        self.dims.last().copied().unwrap_or(0)
    }
}

impl<T> MatrixBatch<T> for ArrayView<'_, T, 3> {
    fn matrix_lanes(&self) -> Result<[&[T]; MATRIX_LANES]> {
        let offsets = lane_offsets::<MATRIX_LANES>(&self.dims, &self.strides, self.offset, &[3, 3])?;
        lanes(self.data, offsets, self.dims[2], self.strides[2])
    }
}

impl<T> VectorBatch<T> for ArrayView<'_, T, 2> {
    fn vector_lanes(&self) -> Result<[&[T]; VECTOR_LANES]> {
        let offsets = lane_offsets::<VECTOR_LANES>(&self.dims, &self.strides, self.offset, &[3])?;
        lanes(self.data, offsets, self.dims[1], self.strides[1])
    }
}

// ============================================================================
// ArrayViewMut
// ============================================================================

/// A mutable strided view over borrowed data.
pub struct ArrayViewMut<'a, T, const N: usize> {
    data: &'a mut [T],
    dims: [usize; N],
    strides: [isize; N],
    offset: usize,
}

impl<'a, T, const N: usize> ArrayViewMut<'a, T, N> {
    /// Create a new mutable strided view.
    ///
    /// # Errors
    /// Returns an error if the view would access out-of-bounds memory.
    pub fn new(
        data: &'a mut [T],
        dims: [usize; N],
        strides: [isize; N],
        offset: usize,
    ) -> Result<Self> {
        validate_bounds(data.len(), &dims, &strides, offset)?;
        Ok(Self {
            data,
            dims,
            strides,
            offset,
        })
    }

    pub(crate) fn contiguous(data: &'a mut [T], dims: [usize; N]) -> Self {
        Self {
            data,
            dims,
            strides: row_major_strides(&dims),
            offset: 0,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize; N] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize; N] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> ArrayView<'_, T, N> {
        ArrayView {
            data: &*self.data,
            dims: self.dims,
            strides: self.strides,
            offset: self.offset,
        }
    }

    /// Reborrow a mutable sub-view over the same memory.
    pub fn slice_dims_mut(
        &mut self,
        bounds: [(usize, usize, usize); N],
    ) -> Result<ArrayViewMut<'_, T, N>> {
        let (dims, strides, offset) = slice_layout(&self.dims, &self.strides, self.offset, bounds)?;
        Ok(ArrayViewMut {
            data: &mut *self.data,
            dims,
            strides,
            offset,
        })
    }
}

impl<'a, T: Copy, const N: usize> ArrayViewMut<'a, T, N> {
    /// Bounds-checked element read.
    pub fn get(&self, index: [usize; N]) -> Result<T> {
        check_index(&index, &self.dims)?;
        Ok(self.data[linear_index(&index, &self.strides, self.offset)])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, index: [usize; N], value: T) -> Result<()> {
        check_index(&index, &self.dims)?;
        self.data[linear_index(&index, &self.strides, self.offset)] = value;
        Ok(())
    }

    /// Overwrite every viewed element.
    pub fn fill(&mut self, value: T) {
        for flat in 0..self.len() {
            let index = unravel(flat, &self.dims);
            self.data[linear_index(&index, &self.strides, self.offset)] = value;
        }
    }
}

impl<'a, T: Element, const N: usize> ArrayViewMut<'a, T, N> {
    pub fn buffer_info(&self) -> BufferInfo {
        BufferInfo::describe::<T>(&self.dims, &self.strides)
    }
}

impl<'a, T> ArrayViewMut<'a, T, 1> {
    pub fn slice_mut<I: SliceIndex>(&mut self, i0: I) -> Result<ArrayViewMut<'_, T, 1>> {
        let b0 = i0.bounds(self.dims[0]);
        self.slice_dims_mut([b0])
    }
}

impl<'a, T> ArrayViewMut<'a, T, 2> {
    pub fn slice_mut<I0: SliceIndex, I1: SliceIndex>(
        &mut self,
        i0: I0,
        i1: I1,
    ) -> Result<ArrayViewMut<'_, T, 2>> {
        let bounds = [i0.bounds(self.dims[0]), i1.bounds(self.dims[1])];
        self.slice_dims_mut(bounds)
    }
}

impl<'a, T> ArrayViewMut<'a, T, 3> {
    pub fn slice_mut<I0: SliceIndex, I1: SliceIndex, I2: SliceIndex>(
        &mut self,
        i0: I0,
        i1: I1,
        i2: I2,
    ) -> Result<ArrayViewMut<'_, T, 3>> {
        let bounds = [
            i0.bounds(self.dims[0]),
            i1.bounds(self.dims[1]),
            i2.bounds(self.dims[2]),
        ];
        self.slice_dims_mut(bounds)
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for ArrayViewMut<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayViewMut")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Copy + fmt::Display, const N: usize> fmt::Display for ArrayViewMut<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_view(), f)
    }
}

impl<T, const N: usize> Size for ArrayViewMut<'_, T, N> {
    #[inline]
    fn size_backend(&self) -> usize {
        self.dims.last().copied().unwrap_or(0)
    }
}

impl<T> MatrixBatch<T> for ArrayViewMut<'_, T, 3> {
    fn matrix_lanes(&self) -> Result<[&[T]; MATRIX_LANES]> {
        let offsets = lane_offsets::<MATRIX_LANES>(&self.dims, &self.strides, self.offset, &[3, 3])?;
        lanes(&*self.data, offsets, self.dims[2], self.strides[2])
    }
}

impl<T> MatrixBatchMut<T> for ArrayViewMut<'_, T, 3> {
    fn matrix_lanes_mut(&mut self) -> Result<[&mut [T]; MATRIX_LANES]> {
        let offsets = lane_offsets::<MATRIX_LANES>(&self.dims, &self.strides, self.offset, &[3, 3])?;
        lanes_mut(&mut *self.data, offsets, self.dims[2], self.strides[2])
    }
}

impl<T> VectorBatch<T> for ArrayViewMut<'_, T, 2> {
    fn vector_lanes(&self) -> Result<[&[T]; VECTOR_LANES]> {
        let offsets = lane_offsets::<VECTOR_LANES>(&self.dims, &self.strides, self.offset, &[3])?;
        lanes(&*self.data, offsets, self.dims[1], self.strides[1])
    }
}

impl<T> VectorBatchMut<T> for ArrayViewMut<'_, T, 2> {
    fn vector_lanes_mut(&mut self) -> Result<[&mut [T]; VECTOR_LANES]> {
        let offsets = lane_offsets::<VECTOR_LANES>(&self.dims, &self.strides, self.offset, &[3])?;
        lanes_mut(&mut *self.data, offsets, self.dims[1], self.strides[1])
    }
}

/// Byte strides for element strides of `T`.
pub(crate) fn byte_strides<T>(strides: &[isize]) -> Vec<isize> {
    strides.iter().map(|&s| s * size_of::<T>() as isize).collect()
}

// ============================================================================
// Tests
// ============================================================================
