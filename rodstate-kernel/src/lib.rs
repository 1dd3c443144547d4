//! Batched SO(3) state updates for director frames.
//!
//! A rotation batch is a `[3, 3, n]` tensor of orthonormal matrices, an
//! increment batch a `[3, n]` matrix of rotation vectors. Both are accessed
//! through the lane traits of `rodstate-traits`, so any storage that exposes
//! contiguous component lanes works.
//!
//! # Operations
//!
//! - [`so3_assign`]: fresh batch from a base batch and increments
//! - [`so3_add_assign`]: in-place update through the compile-time backend
//! - [`so3_add_assign_with`]: in-place update through a named kernel
//! - [`so3_inv_rotate`]: increments between consecutive frames
//! - [`fill_identity`], [`max_orthonormality_error`]
//!
//! # Backends
//!
//! [`ScalarKernel`] updates one element at a time; [`SimdKernel`] updates
//! [`LANES`] elements per step under runtime target-feature dispatch. The
//! `simd` (default) and `scalar` features decide which one [`So3AddAssign`]
//! names. Both evaluate the same per-element arithmetic.
//!
//! # Example
//!
//! ```
//! use rodstate_kernel::{fill_identity, max_orthonormality_error, so3_add_assign};
//! use rodstate_view::{Matrix, Tensor};
//!
//! let mut frames = Tensor::<f64>::zeros([3, 3, 5]);
//! fill_identity(&mut frames).unwrap();
//! let omega = Matrix::<f64>::from_fn([3, 5], |[c, k]| 0.01 * (c + k) as f64);
//! so3_add_assign(&mut frames, &omega).unwrap();
//! assert!(max_orthonormality_error(&frames).unwrap() < 1e-12);
//! ```

pub mod backend;
mod lanes;
mod ops;
pub mod simd;
pub mod so3;
#[cfg(feature = "parallel")]
mod threading;

pub use backend::{
    backend_choice, BackendKind, ScalarKernel, Select, SelectBackend, SimdKernel, So3AddAssign,
    So3AddAssignKernel, SO3_ADD_ASSIGN_KIND,
};
pub use ops::{
    fill_identity, max_orthonormality_error, so3_add_assign, so3_add_assign_with, so3_assign,
    so3_inv_rotate,
};
pub use simd::LANES;

#[cfg(feature = "parallel")]
pub use ops::so3_add_assign_par;
#[cfg(feature = "parallel")]
pub use threading::MIN_PARALLEL_LEN;

pub use rodstate_traits::{Result, StateError};
