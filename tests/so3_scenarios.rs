use approx::assert_abs_diff_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use rodstate::{
    fill_identity, max_orthonormality_error, so3_add_assign, so3_add_assign_with, so3_assign,
    Matrix, ScalarKernel, SimdKernel, StateError, Tensor, LANES,
};

fn identities(n: usize) -> Tensor<f64> {
    let mut t = Tensor::zeros([3, 3, n]);
    fill_identity(&mut t).unwrap();
    t
}

fn random_increments(seed: u64, n: usize, scale: f64) -> Matrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Matrix::from_fn([3, n], |_| scale * rng.sample::<f64, _>(StandardNormal))
}

/// A batch of frames already rotated away from the identity.
fn random_frames(seed: u64, n: usize) -> Tensor<f64> {
    let mut frames = identities(n);
    so3_add_assign(&mut frames, &random_increments(seed, n, 1.0)).unwrap();
    frames
}

#[test]
fn test_zero_increments_keep_identities() {
    let mut frames = identities(4);
    let zero = Matrix::<f64>::zeros([3, 4]);
    so3_add_assign(&mut frames, &zero).unwrap();
    assert_eq!(frames, identities(4));
}

#[test]
fn test_half_turn_about_x() {
    let mut frames = identities(1);
    let inc = Matrix::from_vec([3, 1], vec![std::f64::consts::PI, 0.0, 0.0]).unwrap();
    so3_add_assign(&mut frames, &inc).unwrap();
    let expected = [1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0];
    for (i, &e) in expected.iter().enumerate() {
        assert_abs_diff_eq!(frames.get([i / 3, i % 3, 0]).unwrap(), e, epsilon = 1e-12);
    }
}

#[test]
fn test_zero_increment_leaves_rotated_frame_unchanged() {
    let mut frames = random_frames(21, 6);
    let before = frames.clone();
    let mut inc = random_increments(22, 6, 0.5);
    for c in 0..3 {
        inc.set([c, 2], 0.0).unwrap();
    }
    so3_add_assign(&mut frames, &inc).unwrap();
    for r in 0..3 {
        for c in 0..3 {
            assert_abs_diff_eq!(
                frames.get([r, c, 2]).unwrap(),
                before.get([r, c, 2]).unwrap(),
                epsilon = 1e-14
            );
        }
    }
}

#[test]
fn test_orthonormality_is_preserved_over_many_steps() {
    let n = 37;
    let mut frames = identities(n);
    for step in 0..200 {
        let inc = random_increments(100 + step, n, 0.05);
        so3_add_assign(&mut frames, &inc).unwrap();
    }
    assert!(max_orthonormality_error(&frames).unwrap() < 1e-12);

    let mut assigned = Tensor::<f64>::zeros([3, 3, 0]);
    so3_assign(&mut assigned, &frames, &random_increments(7, n, 2.0)).unwrap();
    assert!(max_orthonormality_error(&assigned).unwrap() < 1e-12);
}

#[test]
fn test_backends_are_equivalent() {
    for n in [0, 1, LANES - 1, LANES, 3 * LANES + 1, 1000] {
        let base = random_frames(n as u64, n);
        let inc = random_increments(n as u64 + 1, n, 0.7);
        let mut scalar = base.clone();
        let mut simd = base.clone();
        so3_add_assign_with::<ScalarKernel, _, _, _>(&mut scalar, &inc).unwrap();
        so3_add_assign_with::<SimdKernel, _, _, _>(&mut simd, &inc).unwrap();
        for (a, b) in scalar.iter().zip(simd.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-14);
        }
    }
}

#[test]
fn test_single_precision_backends_are_equivalent() {
    let n = 2 * LANES + 3;
    let mut rng = StdRng::seed_from_u64(9);
    let inc = Matrix::<f32>::from_fn([3, n], |_| rng.gen_range(-1.0..1.0));
    let mut scalar = Tensor::<f32>::zeros([3, 3, n]);
    fill_identity(&mut scalar).unwrap();
    let mut simd = scalar.clone();
    so3_add_assign_with::<ScalarKernel, _, _, _>(&mut scalar, &inc).unwrap();
    so3_add_assign_with::<SimdKernel, _, _, _>(&mut simd, &inc).unwrap();
    for (a, b) in scalar.iter().zip(simd.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
    assert!(max_orthonormality_error(&simd).unwrap() < 1e-5);
}

#[test]
fn test_add_assign_rejects_length_mismatch() {
    let mut frames = random_frames(3, 5);
    let before = frames.clone();
    let inc = Matrix::<f64>::zeros([3, 4]);
    let err = so3_add_assign(&mut frames, &inc).unwrap_err();
    assert_eq!(
        err,
        StateError::SizeMismatch {
            expected: 5,
            actual: 4
        }
    );
    assert_eq!(frames, before);
}

#[test]
fn test_assign_rejects_length_mismatch() {
    let base = identities(2);
    let inc = Matrix::<f64>::zeros([3, 3]);
    let mut dest = random_frames(1, 6);
    let before = dest.clone();
    assert!(matches!(
        so3_assign(&mut dest, &base, &inc),
        Err(StateError::SizeMismatch { .. })
    ));
    assert_eq!(dest, before);
}

#[test]
fn test_add_assign_through_batch_window() {
    let mut frames = identities(8);
    let inc = random_increments(4, 3, 0.3);
    {
        let mut view = frames.view_mut();
        let mut window = view.slice_mut(.., .., 2..5).unwrap();
        so3_add_assign(&mut window, &inc).unwrap();
    }
    let mut expected = identities(3);
    so3_add_assign(&mut expected, &inc).unwrap();
    for k in 0..8 {
        for r in 0..3 {
            for c in 0..3 {
                let want = if (2..5).contains(&k) {
                    expected.get([r, c, k - 2]).unwrap()
                } else if r == c {
                    1.0
                } else {
                    0.0
                };
                assert_eq!(frames.get([r, c, k]).unwrap(), want);
            }
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_add_assign_matches_serial() {
    let n = 4 * rodstate::MIN_PARALLEL_LEN + 5;
    let inc = random_increments(77, n, 0.5);
    let mut serial = identities(n);
    let mut par = identities(n);
    so3_add_assign(&mut serial, &inc).unwrap();
    rodstate::so3_add_assign_par(&mut par, &inc).unwrap();
    assert_eq!(serial, par);
}
