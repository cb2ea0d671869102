//! Image sampling - splits a source image into cells of density vectors.

use crate::raster::DrawSurface;
use crate::sample::{sample_positions, vector_len};
use crate::{GlyphgridError, Result};
use image::{Rgba, RgbaImage};
use serde::Serialize;

// Monospace glyphs are roughly 1.9 times taller than wide
const ASPECT_DIVISOR: f64 = 1.9;

/// Output grid size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `height = floor(image_height / image_width * width / 1.9)`
    pub fn derive(image_width: u32, image_height: u32, width: u32) -> Self {
        let height = if image_width == 0 {
            0
        } else {
            (image_height as f64 / image_width as f64 * width as f64 / ASPECT_DIVISOR).floor()
                as u32
        };
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Ink density of one pixel: transparent and white are 0, opaque black is 1.
pub fn density(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, a] = pixel.0;
    let luminance = (r as f32 + g as f32 + b as f32) / (3.0 * 255.0);
    let alpha = a as f32 / 255.0;
    1.0 - (luminance * alpha + (1.0 - alpha))
}

/// Value map and color map of one sampling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledImage {
    dims: Dimensions,
    sample_resolution: u32,
    values: Vec<Vec<f32>>,
    colors: Vec<[u8; 4]>,
}

impl SampledImage {
    pub fn empty(dims: Dimensions, s: u32) -> Self {
        Self { dims, sample_resolution: s, values: Vec::new(), colors: Vec::new() }
    }

    /// Read cells from a raster of `(width*s) × (height*s)` pixels.
    ///
    /// The color of each cell is the single pixel at its top-left sub-cell.
    pub fn from_raster(raster: &RgbaImage, dims: Dimensions, s: u32) -> Self {
        debug_assert_eq!(raster.dimensions(), (dims.width * s, dims.height * s));

        let mut values = Vec::with_capacity(dims.cell_count());
        let mut colors = Vec::with_capacity(dims.cell_count());
        for cy in 0..dims.height {
            for cx in 0..dims.width {
                let (x0, y0) = (cx * s, cy * s);
                let mut cell = Vec::with_capacity(vector_len(s));
                for (px, py) in sample_positions(s) {
                    cell.push(density(raster.get_pixel(x0 + px, y0 + py)));
                }
                values.push(cell);
                colors.push(raster.get_pixel(x0, y0).0);
            }
        }

        Self { dims, sample_resolution: s, values, colors }
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn sample_resolution(&self) -> u32 {
        self.sample_resolution
    }

    pub fn values(&self) -> &[Vec<f32>] {
        &self.values
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }
}

pub struct ImageSampler<D> {
    surface: D,
}

impl<D: DrawSurface> ImageSampler<D> {
    pub fn new(surface: D) -> Self {
        Self { surface }
    }

    /// Draw `image` onto a `(width*s) × (height*s)` working surface.
    pub fn draw(&self, image: &RgbaImage, dims: Dimensions, s: u32) -> Result<RgbaImage> {
        let (w, h) = dims
            .width
            .checked_mul(s)
            .zip(dims.height.checked_mul(s))
            .ok_or_else(|| {
                GlyphgridError::Surface(format!(
                    "{}x{} cells at resolution {s} overflow the surface",
                    dims.width, dims.height
                ))
            })?;
        let raster = self.surface.draw(image, w, h)?;
        if raster.dimensions() != (w, h) {
            return Err(GlyphgridError::Surface(format!(
                "surface drew {}x{}, expected {w}x{h}",
                raster.width(),
                raster.height()
            )));
        }
        Ok(raster)
    }

    /// Sample `image` into a grid `width` cells wide.
    ///
    /// Also returns the working raster, or `None` when the grid is empty and
    /// nothing was drawn.
    pub fn sample(
        &self,
        image: &RgbaImage,
        width: u32,
        s: u32,
    ) -> Result<(SampledImage, Option<RgbaImage>)> {
        let dims = Dimensions::derive(image.width(), image.height(), width);
        if dims.is_empty() {
            return Ok((SampledImage::empty(dims, s), None));
        }
        let raster = self.draw(image, dims, s)?;
        let sampled = SampledImage::from_raster(&raster, dims, s);
        Ok((sampled, Some(raster)))
    }
}
