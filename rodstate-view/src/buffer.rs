//! Raw byte-buffer exchange.
//!
//! [`BufferInfo`] describes memory being exported (shape, byte strides, and
//! format tag). [`RawBuffer`] is the borrowed input of an import. Imports
//! check format first, then rank, then byte length, and copy the data.

use std::mem::size_of;

use rodstate_traits::{Element, Result, StateError};

use crate::view::byte_strides;

/// Description of exported memory.
///
/// Strides are in bytes, matching the buffer protocol of numerical hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    pub itemsize: usize,
    pub format: &'static str,
    pub ndim: usize,
    pub shape: Vec<usize>,
    pub strides: Vec<isize>,
}

impl BufferInfo {
    pub(crate) fn describe<T: Element>(dims: &[usize], strides: &[isize]) -> Self {
        Self {
            itemsize: size_of::<T>(),
            format: T::FORMAT,
            ndim: dims.len(),
            shape: dims.to_vec(),
            strides: byte_strides::<T>(strides),
        }
    }
}

/// A borrowed, contiguous row-major byte buffer offered for import.
#[derive(Debug, Clone, Copy)]
pub struct RawBuffer<'a> {
    pub bytes: &'a [u8],
    pub format: &'a str,
    pub shape: &'a [usize],
}

impl<'a> RawBuffer<'a> {
    pub fn new(bytes: &'a [u8], format: &'a str, shape: &'a [usize]) -> Self {
        Self {
            bytes,
            format,
            shape,
        }
    }

    /// Wrap a typed slice, tagging it with the element's format.
    pub fn from_slice<T: Element>(values: &'a [T], shape: &'a [usize]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(values),
            format: T::FORMAT,
            shape,
        }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// Validate `buffer` against `T` and rank `N`, returning dims and a copy of
/// the elements.
pub(crate) fn decode<T: Element, const N: usize>(
    buffer: &RawBuffer<'_>,
) -> Result<([usize; N], Vec<T>)> {
    if buffer.format != T::FORMAT {
        return Err(StateError::IncompatibleFormat {
            type_name: T::NAME,
            expected: T::FORMAT,
            actual: buffer.format.to_string(),
        });
    }
    if buffer.ndim() != N {
        return Err(StateError::IncompatibleDimension {
            expected: N,
            actual: buffer.ndim(),
        });
    }
    let dims: [usize; N] = std::array::from_fn(|i| buffer.shape[i]);
    let expected = dims
        .iter()
        .try_fold(size_of::<T>(), |acc, &d| acc.checked_mul(d))
        .ok_or(StateError::OffsetOverflow)?;
    if buffer.bytes.len() != expected {
        return Err(StateError::BufferLength {
            expected,
            actual: buffer.bytes.len(),
        });
    }
    // Host buffers carry no alignment guarantee.
    let data = buffer
        .bytes
        .chunks_exact(size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect();
    Ok((dims, data))
}
