//! Rayon-based parallel execution over disjoint index ranges.

use rodstate_traits::{Real, MATRIX_LANES, VECTOR_LANES};

use crate::lanes::{batch_len, split_lanes, split_lanes_mut};
use crate::simd::LANES;

/// Minimum batch length worth handing to another thread.
pub const MIN_PARALLEL_LEN: usize = 1 << 12;

/// Recursive halving with `rayon::join` down to [`MIN_PARALLEL_LEN`].
///
/// Split points are rounded to a multiple of [`LANES`] so every leaf but the
/// last runs whole lane groups.
pub(crate) fn for_each_range<T, F>(
    matrices: [&mut [T]; MATRIX_LANES],
    increments: [&[T]; VECTOR_LANES],
    f: &F,
) where
    T: Real,
    F: Fn([&mut [T]; MATRIX_LANES], [&[T]; VECTOR_LANES]) + Sync,
{
    let n = batch_len(&increments);
    let mid = n / 2 / LANES * LANES;
    if n <= MIN_PARALLEL_LEN || mid == 0 {
        f(matrices, increments);
        return;
    }
    let (m_left, m_right) = split_lanes_mut(matrices, mid);
    let (v_left, v_right) = split_lanes(increments, mid);
    rayon::join(
        || for_each_range(m_left, v_left, f),
        || for_each_range(m_right, v_right, f),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_leaves_cover_batch_once() {
        let n = 5 * MIN_PARALLEL_LEN + 3;
        let mut data = vec![0.0f64; 9 * n];
        let inc = vec![0.0f64; 3 * n];
        let mut chunks = data.chunks_mut(n);
        let m: [&mut [f64]; 9] = std::array::from_fn(|_| chunks.next().unwrap_or_default());
        let v = [&inc[..n], &inc[n..2 * n], &inc[2 * n..]];

        let leaves = AtomicUsize::new(0);
        for_each_range(m, v, &|m: [&mut [f64]; 9], v: [&[f64]; 3]| {
            assert!(v[0].len() <= MIN_PARALLEL_LEN);
            leaves.fetch_add(1, Ordering::Relaxed);
            for lane in m {
                for x in lane.iter_mut() {
                    *x += 1.0;
                }
            }
        });
        assert!(leaves.load(Ordering::Relaxed) >= 2);
        assert!(data.iter().all(|&x| x == 1.0));
    }
}
