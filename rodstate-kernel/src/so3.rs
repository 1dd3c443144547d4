//! Per-element SO(3) math.
//!
//! Everything except the trigonometric coefficients is written against
//! [`Lane`], so the same arithmetic runs on a single scalar (scalar backend)
//! and on a [`Pack`](crate::simd::Pack) of elements (SIMD backend).
//!
//! Matrices are row-major `[L; 9]`: entry `(r, c)` is at `3 * r + c`.

use std::ops::{Add, Mul, Sub};

use rodstate_traits::Real;

/// Arithmetic shared by scalars and lane groups.
pub trait Lane: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {}

impl<L> Lane for L where L: Copy + Add<Output = L> + Sub<Output = L> + Mul<Output = L> {}

pub type Mat3<L> = [L; 9];
pub type Vec3<L> = [L; 3];

/// Coefficients of `exp(-[v]x) = cos θ I + b u uᵀ - a [u]x`.
///
/// Below [`Real::SMALL_ANGLE`] the axis is `u = v` itself, with
/// `a = sin θ / θ` and `b = (1 - cos θ) / θ²` from a Taylor series.
/// Above it `u = v / θ` is the unit axis with `a = sin θ` and
/// `b = 1 - cos θ`, so no term grows with `|v|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients<L> {
    /// `cos θ`
    pub cos: L,
    /// `a`
    pub sin: L,
    /// `b`
    pub versin: L,
    /// `u`
    pub axis: Vec3<L>,
}

impl<T: Real> Coefficients<T> {
    pub fn new(v: Vec3<T>) -> Self {
        let theta = angle(v);
        if theta < T::SMALL_ANGLE {
            let [cos, sinc, cosc] = series(theta * theta);
            Self {
                cos,
                sin: sinc,
                versin: cosc,
                axis: v,
            }
        } else {
            let [cos, sin, versin] = closed(theta);
            Self {
                cos,
                sin,
                versin,
                axis: v.map(|x| x / theta),
            }
        }
    }
}

/// `[cos θ, sin θ / θ, (1 - cos θ) / θ²]` through `θ⁴`.
fn series<T: Real>(theta_sq: T) -> [T; 3] {
    let t2 = theta_sq * theta_sq;
    [
        T::one() - theta_sq * T::constant(0.5) + t2 / T::constant(24.0),
        T::one() - theta_sq / T::constant(6.0) + t2 / T::constant(120.0),
        T::constant(0.5) - theta_sq / T::constant(24.0) + t2 / T::constant(720.0),
    ]
}

/// `[cos θ, sin θ, 1 - cos θ]`
fn closed<T: Real>(theta: T) -> [T; 3] {
    let (sin, cos) = theta.sin_cos();
    let s = (theta * T::constant(0.5)).sin();
    [cos, sin, T::constant(2.0) * s * s]
}

/// Euclidean norm of `v`, scaled by its largest component so the squares
/// cannot overflow.
pub fn angle<T: Real>(v: Vec3<T>) -> T {
    let m = v[0].abs().max(v[1].abs()).max(v[2].abs());
    if m == T::zero() {
        return m;
    }
    let [x, y, z] = v.map(|c| c / m);
    m * (x * x + y * y + z * z).sqrt()
}

/// Rotation matrix `exp(-[v]x)` from precomputed coefficients.
#[inline(always)]
pub fn rotation<L: Lane>(k: Coefficients<L>) -> Mat3<L> {
    let Coefficients {
        cos,
        sin: a,
        versin: b,
        axis: [x, y, z],
    } = k;
    let (ax, ay, az) = (a * x, a * y, a * z);
    let (bxy, bxz, byz) = (b * x * y, b * x * z, b * y * z);
    [
        cos + b * x * x,
        bxy + az,
        bxz - ay,
        bxy - az,
        cos + b * y * y,
        byz + ax,
        bxz + ay,
        byz - ax,
        cos + b * z * z,
    ]
}

#[inline(always)]
pub fn matmul<L: Lane>(lhs: &Mat3<L>, rhs: &Mat3<L>) -> Mat3<L> {
    std::array::from_fn(|i| {
        let (r, c) = (i / 3, i % 3);
        lhs[3 * r] * rhs[c] + lhs[3 * r + 1] * rhs[3 + c] + lhs[3 * r + 2] * rhs[6 + c]
    })
}

/// `XᵀX`
#[inline(always)]
pub fn gram<L: Lane>(x: &Mat3<L>) -> Mat3<L> {
    std::array::from_fn(|i| {
        let (r, c) = (i / 3, i % 3);
        x[r] * x[c] + x[3 + r] * x[3 + c] + x[6 + r] * x[6 + c]
    })
}

/// One Newton–Schulz polar step, `X ← 1.5 X - 0.5 X (XᵀX)`.
#[inline(always)]
pub fn orthonormalize<L: Lane>(x: &Mat3<L>, half: L, three_halves: L) -> Mat3<L> {
    let xg = matmul(x, &gram(x));
    std::array::from_fn(|i| three_halves * x[i] - half * xg[i])
}

/// Rotate `q` by the increment behind `k` and project back onto SO(3).
#[inline(always)]
pub fn update<L: Lane>(q: &Mat3<L>, k: Coefficients<L>, half: L, three_halves: L) -> Mat3<L> {
    let composed = matmul(&rotation(k), q);
    orthonormalize(&composed, half, three_halves)
}

/// Scalar convenience wrapper around [`update`].
#[inline]
pub fn step<T: Real>(q: &Mat3<T>, v: Vec3<T>) -> Mat3<T> {
    update(q, Coefficients::new(v), T::constant(0.5), T::constant(1.5))
}

pub fn identity<T: Real>() -> Mat3<T> {
    let (o, z) = (T::one(), T::zero());
    [o, z, z, z, o, z, z, z, o]
}

pub fn transpose<L: Copy>(m: &Mat3<L>) -> Mat3<L> {
    std::array::from_fn(|i| m[3 * (i % 3) + i / 3])
}

pub fn determinant<T: Real>(m: &Mat3<T>) -> T {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}

/// Larger of `a` and `b`, keeping NaN instead of discarding it.
#[inline]
pub(crate) fn worst<T: Real>(a: T, b: T) -> T {
    if a.is_nan() {
        a
    } else if b.is_nan() || b > a {
        b
    } else {
        a
    }
}

/// `max(max|RᵀR - I|, |det R - 1|)`, or infinity when `m` is not finite.
pub fn orthonormality_error<T: Real>(m: &Mat3<T>) -> T {
    if m.iter().any(|x| !x.is_finite()) {
        return T::infinity();
    }
    let g = gram(m);
    let eye = identity::<T>();
    let err = g
        .iter()
        .zip(eye.iter())
        .map(|(&a, &b)| (a - b).abs())
        .chain(std::iter::once((determinant(m) - T::one()).abs()))
        .fold(T::zero(), worst);
    if err.is_nan() {
        T::infinity()
    } else {
        err
    }
}

/// Increment `v` with `exp(-[v]x) · from = to`, for rotation angles below π.
pub fn log_between<T: Real>(from: &Mat3<T>, to: &Mat3<T>) -> Vec3<T> {
    let r = matmul(to, &transpose(from));
    let axial = [r[5] - r[7], r[6] - r[2], r[1] - r[3]];
    let half = T::constant(0.5);
    let s = angle(axial) * half;
    let c = (r[0] + r[4] + r[8] - T::one()) * half;
    let theta = s.atan2(c);
    let factor = if theta < T::SMALL_ANGLE {
        half + theta * theta / T::constant(12.0)
    } else {
        theta / (s + s)
    };
    axial.map(|a| factor * a)
}
