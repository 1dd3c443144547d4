//! Text rendering of dense arrays.
//!
//! The innermost axis prints as a parenthesised sequence `(a,b,c)`. Each
//! outer axis stacks its sub-arrays on separate lines, with one extra blank
//! line per level above a matrix.

use std::fmt;

pub(crate) fn write_nested<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    dims: &[usize],
    data: &[T],
) -> fmt::Result {
    match dims.split_first() {
        None => match data.first() {
            Some(value) => write!(f, "{value}"),
            None => Ok(()),
        },
        Some((_, [])) => write_sequence(f, data),
        Some((&outer, inner)) => {
            let chunk: usize = inner.iter().product();
            let separator = "\n".repeat(inner.len());
            for i in 0..outer {
                if i > 0 {
                    f.write_str(&separator)?;
                }
                write_nested(f, inner, &data[i * chunk..(i + 1) * chunk])?;
            }
            Ok(())
        }
    }
}

fn write_sequence<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    f.write_str("(")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str(")")
}
