//! AddAssign kernel strategies and the compile-time backend selector.
//!
//! A backend is a marker type implementing [`So3AddAssignKernel`]. The
//! selector maps the configured [`BackendKind`] to one of them through an
//! associated type, so calls through [`So3AddAssign`] are resolved without
//! any runtime branching.

pub mod scalar;
pub mod simd;

use rodstate_traits::{MatrixBatchMut, Real, Result, VectorBatch, MATRIX_LANES, VECTOR_LANES};

use crate::lanes::update_lanes;

/// Execution strategy of an AddAssign kernel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Scalar = 0,
    Simd = 1,
}

/// Backend chosen by the build configuration.
///
/// The `scalar` feature forces [`BackendKind::Scalar`]; otherwise `simd`
/// selects [`BackendKind::Simd`].
pub const fn backend_choice() -> BackendKind {
    if cfg!(feature = "scalar") {
        BackendKind::Scalar
    } else if cfg!(feature = "simd") {
        BackendKind::Simd
    } else {
        BackendKind::Scalar
    }
}

/// Backend used by [`so3_add_assign`](crate::so3_add_assign).
pub const SO3_ADD_ASSIGN_KIND: BackendKind = backend_choice();

/// In-place SO(3) update over component lanes.
///
/// `matrix[k] ← orthonormalize(exp(-[v_k]x) · matrix[k])` for every `k`.
/// Implementations differ only in execution granularity; every index gets
/// the same arithmetic.
pub trait So3AddAssignKernel {
    const KIND: BackendKind;

    /// Update lanes of equal length in place.
    ///
    /// This is the unchecked entry point; [`apply`](Self::apply) validates
    /// lengths and shapes first.
    ///
    /// # Panics
    /// Lanes of unequal length are a caller error. Debug builds always
    /// panic on them; release builds panic when any lane is shorter than
    /// the first increment lane.
    fn apply_lanes<T: Real>(matrices: [&mut [T]; MATRIX_LANES], increments: [&[T]; VECTOR_LANES]);

    /// Validate and update a matrix batch in place.
    ///
    /// # Errors
    /// [`StateError::SizeMismatch`](rodstate_traits::StateError::SizeMismatch)
    /// when the batch lengths differ, or the container's lane error when a
    /// batch has the wrong shape. Nothing is written on failure.
    fn apply<T, M, V>(matrices: &mut M, increments: &V) -> Result<()>
    where
        T: Real,
        M: MatrixBatchMut<T> + ?Sized,
        V: VectorBatch<T> + ?Sized,
    {
        let (lanes, increments) = update_lanes(matrices, increments)?;
        tracing::trace!(n = increments[0].len(), backend = ?Self::KIND, "so3 add-assign");
        Self::apply_lanes(lanes, increments);
        Ok(())
    }
}

/// Marker type for the one-element-at-a-time kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

/// Marker type for the lane-group kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdKernel;

/// Selector keyed by a [`BackendKind`] discriminant.
pub struct Select<const KIND: u8>;

pub trait SelectBackend {
    type Kernel: So3AddAssignKernel;
}

impl SelectBackend for Select<{ BackendKind::Scalar as u8 }> {
    type Kernel = ScalarKernel;
}

impl SelectBackend for Select<{ BackendKind::Simd as u8 }> {
    type Kernel = SimdKernel;
}

/// The AddAssign kernel fixed at compile time.
pub type So3AddAssign = <Select<{ SO3_ADD_ASSIGN_KIND as u8 }> as SelectBackend>::Kernel;
