//! Lane-group strategy.
//!
//! The batch is cut at the last multiple of [`LANES`]. The body runs on
//! [`Pack`] groups under target-feature dispatch, the tail goes through the
//! scalar kernel. Each group is loaded whole and stored whole, and a group
//! only touches its own indices.

use rodstate_traits::{Real, MATRIX_LANES, VECTOR_LANES};

use super::{BackendKind, ScalarKernel, SimdKernel, So3AddAssignKernel};
use crate::lanes::{batch_len, debug_assert_uniform, split_lanes, split_lanes_mut};
use crate::simd::{dispatch, Pack, LANES};
use crate::so3::{self, Coefficients};

impl So3AddAssignKernel for SimdKernel {
    const KIND: BackendKind = BackendKind::Simd;

    fn apply_lanes<T: Real>(matrices: [&mut [T]; MATRIX_LANES], increments: [&[T]; VECTOR_LANES]) {
        debug_assert_uniform(&matrices, &increments);
        let n = batch_len(&increments);
        let body = n / LANES * LANES;
        let (m_body, m_tail) = split_lanes_mut(matrices, body);
        let (v_body, v_tail) = split_lanes(increments, body);
        dispatch(|| apply_groups(m_body, v_body));
        ScalarKernel::apply_lanes(m_tail, v_tail);
    }
}

#[inline(always)]
fn apply_groups<T: Real>(mut matrices: [&mut [T]; MATRIX_LANES], increments: [&[T]; VECTOR_LANES]) {
    let half = Pack::splat(T::constant(0.5));
    let three_halves = Pack::splat(T::constant(1.5));
    let n = batch_len(&increments);
    for start in (0..n).step_by(LANES) {
        let q: so3::Mat3<Pack<T>> = std::array::from_fn(|i| Pack::load(&matrices[i][start..]));
        let v: so3::Vec3<Pack<T>> = std::array::from_fn(|c| Pack::load(&increments[c][start..]));
        let r = so3::update(&q, Coefficients::gather(v), half, three_halves);
        for (lane, group) in matrices.iter_mut().zip(r) {
            group.store(&mut lane[start..]);
        }
    }
}
