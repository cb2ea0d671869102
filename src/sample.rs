//! Sub-cell traversal order shared by glyph profiling and image sampling.
//!
//! Density vectors are compared positionally, so both sides must visit the
//! `S×S` sub-cells in the same order: row-major, `y` outer and `x` inner.

/// Iterate `(x, y)` sub-cell positions of an `s×s` grid in row-major order.
pub fn sample_positions(s: u32) -> impl Iterator<Item = (u32, u32)> {
    (0..s).flat_map(move |y| (0..s).map(move |x| (x, y)))
}

/// Length of a density vector for sample resolution `s`.
pub fn vector_len(s: u32) -> usize {
    (s * s) as usize
}
