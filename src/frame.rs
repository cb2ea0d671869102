//! Renderer-facing output grid.

use crate::palette::DisplayColor;
use crate::sampler::Dimensions;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub ch: char,
    pub color: Option<DisplayColor>,
}

/// `width × height` cells in row-major order, replaced wholesale on every
/// recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl Frame {
    pub fn new(dims: Dimensions, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), dims.cell_count());
        Self { width: dims.width, height: dims.height, cells }
    }

    pub fn dims(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Characters only, one line per row.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter().map(|c| c.ch));
            out.push('\n');
        }
        out
    }

    /// Characters with 24-bit ANSI foreground colors. Alpha is ignored.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            for cell in row {
                match cell.color {
                    Some(c) => {
                        let _ = write!(out, "\x1b[38;2;{};{};{}m{}", c.r, c.g, c.b, cell.ch);
                    }
                    None => out.push(cell.ch),
                }
            }
            out.push_str("\x1b[0m\n");
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
