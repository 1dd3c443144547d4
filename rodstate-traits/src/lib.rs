//! Shared traits for the rodstate crates.
//!
//! This crate provides the core definitions that are shared across
//! `rodstate-view`, `rodstate-kernel`, and external storage crates:
//!
//! - [`Element`] / [`Real`]: scalar bounds and buffer format tags
//! - [`Size`] / [`Resize`]: element-count introspection of any container
//! - [`MatrixBatch`] / [`VectorBatch`]: structure-of-arrays access used by
//!   the SO(3) kernels
//! - [`StateError`]: the error type shared by every crate in the workspace
//!
//! Storage crates can depend on `rodstate-traits` alone to make their types
//! usable with the kernels without orphan rule violations.

pub mod batch;
pub mod element;
pub mod scalar;

pub use batch::{
    resize_backend, size_backend, MatrixBatch, MatrixBatchMut, Resize, Size, VectorBatch,
    VectorBatchMut, MATRIX_LANES, VECTOR_LANES,
};
pub use element::Element;
pub use scalar::Real;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by rod state containers and kernels.
///
/// Every variant is detected before any element is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Two batches that must correspond index-for-index have different lengths.
    #[error("size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Bounds-checked element access with an index outside the shape.
    #[error("index {index:?} out of range for shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Vec<usize> },

    /// External buffer carries a different scalar type.
    #[error(
        "incompatible format: expected a {type_name} array, corresponding to {expected}. Got type {actual}"
    )]
    IncompatibleFormat {
        type_name: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// External buffer has a different rank.
    #[error("incompatible dimension: expected rank {expected}, got {actual}")]
    IncompatibleDimension { expected: usize, actual: usize },

    /// External buffer size does not match its declared shape.
    #[error("buffer holds {actual} bytes but its shape requires {expected}")]
    BufferLength { expected: usize, actual: usize },

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// The batch axis of a view is not unit-stride.
    #[error("batch axis is not contiguous (stride {stride})")]
    NonContiguousBatch { stride: isize },

    /// Slice bounds or step are invalid for the sliced dimension.
    #[error("invalid slice {start}..{end} step {step} for dim of length {len}")]
    InvalidSlice {
        start: usize,
        end: usize,
        step: usize,
        len: usize,
    },

    /// Mutable batch lanes of a view would share elements.
    #[error("batch lanes overlap in memory")]
    OverlappingLanes,

    /// Integer overflow or out-of-bounds access while computing an offset.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,
}

/// Result type for rod state operations.
pub type Result<T> = std::result::Result<T, StateError>;
