//! Element types storable in rod state containers.

use std::fmt::{Debug, Display};

/// A plain-old-data value that can live in a dense container and cross a
/// byte-buffer boundary.
///
/// `FORMAT` is the single-character buffer-protocol tag used when exporting
/// or importing raw memory; `NAME` is the human-readable type name reported
/// in format errors.
pub trait Element:
    bytemuck::Pod + Default + Debug + Display + PartialEq + Send + Sync + 'static
{
    /// Buffer-protocol format tag.
    const FORMAT: &'static str;

    /// Short type name used in diagnostics.
    const NAME: &'static str;
}

macro_rules! impl_element {
    ($($t:ty => $fmt:expr),* $(,)?) => {
        $(impl Element for $t {
            const FORMAT: &'static str = $fmt;
            const NAME: &'static str = stringify!($t);
        })*
    };
}

impl_element!(f32 => "f", f64 => "d", i32 => "i", i64 => "q", u32 => "I", u64 => "Q");

#[cfg(target_pointer_width = "64")]
impl_element!(usize => "Q");

#[cfg(target_pointer_width = "32")]
impl_element!(usize => "I");
