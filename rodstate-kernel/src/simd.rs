//! Lane groups and target-feature dispatch.

use std::ops::{Add, Mul, Sub};

use rodstate_traits::Real;

use crate::so3::{Coefficients, Vec3};

/// Number of batch elements processed together by the SIMD backend.
pub const LANES: usize = 4;

#[inline(always)]
pub(crate) fn dispatch<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        pulp::Arch::new().dispatch(f)
    }
    #[cfg(not(feature = "simd"))]
    {
        f()
    }
}

/// `LANES` consecutive batch elements of one matrix or vector component.
///
/// Arithmetic is element-wise. Inside [`dispatch`] the compiler lowers it to
/// the widest vector instructions the running CPU supports.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Pack<T>(pub [T; LANES]);

impl<T: Copy> Pack<T> {
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Pack([value; LANES])
    }

    /// Load the first `LANES` elements of `src`.
    #[inline(always)]
    pub fn load(src: &[T]) -> Self {
        Pack(std::array::from_fn(|i| src[i]))
    }

    #[inline(always)]
    pub fn store(self, dst: &mut [T]) {
        dst[..LANES].copy_from_slice(&self.0);
    }
}

macro_rules! impl_pack_op {
    ($($trait:ident :: $method:ident),*) => {
        $(impl<T: Copy + $trait<Output = T>> $trait for Pack<T> {
            type Output = Pack<T>;

            #[inline(always)]
            fn $method(self, rhs: Pack<T>) -> Pack<T> {
                Pack(std::array::from_fn(|i| self.0[i].$method(rhs.0[i])))
            }
        })*
    };
}

impl_pack_op!(Add::add, Sub::sub, Mul::mul);

impl<T: Real> Coefficients<Pack<T>> {
    /// Evaluate the coefficients of every lane independently.
    #[inline(always)]
    pub fn gather(v: Vec3<Pack<T>>) -> Self {
        let each: [Coefficients<T>; LANES] =
            std::array::from_fn(|i| Coefficients::new(v.map(|c| c.0[i])));
        Coefficients {
            cos: Pack(each.map(|k| k.cos)),
            sin: Pack(each.map(|k| k.sin)),
            versin: Pack(each.map(|k| k.versin)),
            axis: std::array::from_fn(|c| Pack(each.map(|k| k.axis[c]))),
        }
    }
}
