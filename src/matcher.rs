//! Nearest-glyph lookup by L1 distance between density vectors.

use crate::glyph::GlyphSet;
use crate::{GlyphgridError, Result};
use rayon::prelude::*;

pub struct Matcher<'a> {
    glyphs: &'a GlyphSet,
}

impl<'a> Matcher<'a> {
    pub fn new(glyphs: &'a GlyphSet) -> Result<Self> {
        if glyphs.is_empty() {
            return Err(GlyphgridError::EmptyCharset);
        }
        Ok(Self { glyphs })
    }

    /// Character whose normalized profile is closest to `cell`.
    ///
    /// Candidates are visited in charset order and only a strictly smaller
    /// distance replaces the current best, so the first of equals wins.
    pub fn best_match(&self, cell: &[f32]) -> char {
        debug_assert!(
            self.glyphs.normalized().iter().all(|p| p.len() == cell.len()),
            "glyph and cell sample resolutions differ"
        );

        let mut best_char = ' ';
        let mut best_dist = f32::INFINITY;
        for (ch, profile) in self.glyphs.iter() {
            let dist: f32 = profile.iter().zip(cell).map(|(g, c)| (g - c).abs()).sum();
            if dist < best_dist {
                best_dist = dist;
                best_char = ch;
            }
        }
        best_char
    }

    /// Match every cell, preserving cell order.
    pub fn match_all(&self, cells: &[Vec<f32>]) -> Vec<char> {
        cells.par_iter().map(|cell| self.best_match(cell)).collect()
    }
}
