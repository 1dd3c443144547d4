//! Dense storage adapters for rod state.
//!
//! This crate provides the concrete containers the SO(3) kernels operate on:
//!
//! - [`DenseArray`] with the [`Vector`], [`IndexVector`], [`Matrix`] and
//!   [`Tensor`] aliases: owned, row-major, last axis is the batch axis
//! - [`ArrayView`] / [`ArrayViewMut`]: zero-copy strided windows with
//!   bounds-checked access and slicing
//! - [`BufferInfo`] / [`RawBuffer`]: byte-buffer export and import with
//!   format, rank and length checks
//!
//! All containers implement the batch traits from `rodstate-traits`, so a
//! `[3, 3, n]` tensor (or a contiguous window of one) can be handed straight
//! to the kernels.
//!
//! # Example
//!
//! ```
//! use rodstate_view::{Tensor, StepRange};
//! use rodstate_traits::Size;
//!
//! let frames = Tensor::<f64>::zeros([3, 3, 8]);
//! assert_eq!(frames.size_backend(), 8);
//!
//! let view = frames.view();
//! let evens = view.slice(.., .., StepRange::new(0, 8, 2)).unwrap();
//! assert_eq!(evens.dims(), &[3, 3, 4]);
//! ```

mod array;
mod buffer;
mod fmt;
mod view;

pub use array::{DenseArray, IndexVector, Matrix, Tensor, Vector};
pub use buffer::{BufferInfo, RawBuffer};
pub use view::{row_major_strides, ArrayView, ArrayViewMut, SliceIndex, StepRange};

pub use rodstate_traits::{Result, StateError};
