//! Batched SO(3) director-frame state for elastic rod simulation.
//!
//! Facade over the workspace crates:
//!
//! - [`rodstate_traits`]: errors, scalar bounds and container introspection
//!   ([`size_backend`], [`resize_backend`])
//! - [`rodstate_view`]: dense arrays, strided views and buffer exchange
//! - [`rodstate_kernel`]: the Assign / AddAssign kernels and the backend
//!   selector
//!
//! # Example
//!
//! ```
//! use rodstate::{fill_identity, so3_add_assign, Matrix, Tensor};
//!
//! let mut frames = Tensor::<f64>::zeros([3, 3, 1]);
//! fill_identity(&mut frames).unwrap();
//! let half_turn = Matrix::from_vec([3, 1], vec![std::f64::consts::PI, 0.0, 0.0]).unwrap();
//! so3_add_assign(&mut frames, &half_turn).unwrap();
//! assert!((frames.get([1, 1, 0]).unwrap() + 1.0).abs() < 1e-12);
//! ```

pub use rodstate_kernel as kernel;
pub use rodstate_traits as traits;
pub use rodstate_view as view;

pub use rodstate_kernel::{
    backend_choice, fill_identity, max_orthonormality_error, so3_add_assign, so3_add_assign_with,
    so3_assign, so3_inv_rotate, BackendKind, ScalarKernel, SimdKernel, So3AddAssign,
    So3AddAssignKernel, LANES, SO3_ADD_ASSIGN_KIND,
};
#[cfg(feature = "parallel")]
pub use rodstate_kernel::{so3_add_assign_par, MIN_PARALLEL_LEN};
pub use rodstate_traits::{
    resize_backend, size_backend, Element, MatrixBatch, MatrixBatchMut, Real, Resize, Result,
    Size, StateError, VectorBatch, VectorBatchMut,
};
pub use rodstate_view::{
    ArrayView, ArrayViewMut, BufferInfo, DenseArray, IndexVector, Matrix, RawBuffer, SliceIndex,
    StepRange, Tensor, Vector,
};
