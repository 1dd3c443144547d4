//! One element at a time: the reference strategy.

use rodstate_traits::{Real, MATRIX_LANES, VECTOR_LANES};

use super::{BackendKind, ScalarKernel, So3AddAssignKernel};
use crate::lanes::{batch_len, debug_assert_uniform};
use crate::so3;

impl So3AddAssignKernel for ScalarKernel {
    const KIND: BackendKind = BackendKind::Scalar;

    fn apply_lanes<T: Real>(
        mut matrices: [&mut [T]; MATRIX_LANES],
        increments: [&[T]; VECTOR_LANES],
    ) {
        debug_assert_uniform(&matrices, &increments);
        let n = batch_len(&increments);
        for k in 0..n {
            let q: so3::Mat3<T> = std::array::from_fn(|i| matrices[i][k]);
            let v: so3::Vec3<T> = std::array::from_fn(|c| increments[c][k]);
            let r = so3::step(&q, v);
            for (lane, value) in matrices.iter_mut().zip(r) {
                lane[k] = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_each_index() {
        // two identity frames, lane-major
        let mut data = vec![0.0f64; 18];
        for d in [0, 4, 8] {
            data[2 * d] = 1.0;
            data[2 * d + 1] = 1.0;
        }
        let inc = [0.0, std::f64::consts::PI, 0.0, 0.0, 0.0, 0.0];
        let mut chunks = data.chunks_mut(2);
        let m: [&mut [f64]; 9] = std::array::from_fn(|_| chunks.next().unwrap_or_default());
        ScalarKernel::apply_lanes(m, [&inc[0..2], &inc[2..4], &inc[4..6]]);

        // element 0 untouched, element 1 turned by π about x
        assert_eq!(data[8], 1.0);
        assert!((data[1] - 1.0).abs() < 1e-12);
        assert!((data[9] + 1.0).abs() < 1e-12);
        assert!((data[17] + 1.0).abs() < 1e-12);
    }
}
