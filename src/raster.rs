//! Rasterization capabilities used by glyph profiling and image sampling.

use crate::{GlyphgridError, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Default side length of the square glyph raster.
pub const FOOTPRINT: u32 = 12;

/// Renders a single character onto a square RGBA raster.
///
/// Ink is carried in the alpha channel; color channels are ignored by the
/// profiler.
pub trait GlyphRasterizer {
    /// Side length of every raster returned by [`GlyphRasterizer::rasterize`].
    fn footprint(&self) -> u32;

    fn rasterize(&self, ch: char) -> Result<RgbaImage>;
}

/// Draws a decoded image scaled onto a working surface of a given size.
pub trait DrawSurface {
    fn draw(&self, image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage>;
}

/// Wrap a raw RGBA buffer, failing if it does not match the dimensions.
pub fn rgba_from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage> {
    RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        GlyphgridError::Surface(format!("buffer does not hold {width}x{height} RGBA pixels"))
    })
}

/// Scales with bilinear filtering, like a 2D canvas `drawImage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledSurface;

impl ScaledSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DrawSurface for ScaledSurface {
    fn draw(&self, image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
        if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
            return Err(GlyphgridError::Surface(format!(
                "cannot draw {}x{} image onto {width}x{height} surface",
                image.width(),
                image.height()
            )));
        }
        Ok(imageops::resize(image, width, height, FilterType::Triangle))
    }
}

/// Glyph rasterizer backed by a monospace font loaded with fontdue.
#[cfg(not(target_arch = "wasm32"))]
pub struct FontRasterizer {
    font: fontdue::Font,
    footprint: u32,
    font_size: f32,
}

#[cfg(not(target_arch = "wasm32"))]
impl FontRasterizer {
    pub fn new(font_data: Vec<u8>, footprint: u32) -> Result<Self> {
        if footprint == 0 {
            return Err(GlyphgridError::Surface("glyph footprint must be non-zero".into()));
        }
        let font = fontdue::Font::from_bytes(font_data, fontdue::FontSettings::default())
            .map_err(|e| GlyphgridError::Surface(e.to_string()))?;
        Ok(Self { font, footprint, font_size: footprint as f32 })
    }

    pub fn from_file(path: impl AsRef<std::path::Path>, footprint: u32) -> Result<Self> {
        let font_data = std::fs::read(path)?;
        Self::new(font_data, footprint)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GlyphRasterizer for FontRasterizer {
    fn footprint(&self) -> u32 {
        self.footprint
    }

    fn rasterize(&self, ch: char) -> Result<RgbaImage> {
        let side = self.footprint;
        let mut img = RgbaImage::new(side, side);

        let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
        if metrics.width == 0 || metrics.height == 0 {
            return Ok(img);
        }

        // Baseline at ~75% down
        let baseline_y = (side as f32 * 0.75) as i32;
        let y_offset = baseline_y - metrics.height as i32 - metrics.ymin;
        let x_offset = (side as i32 - metrics.width as i32) / 2;

        for sy in 0..metrics.height {
            for sx in 0..metrics.width {
                let tx = x_offset + sx as i32;
                let ty = y_offset + sy as i32;
                if tx >= 0 && tx < side as i32 && ty >= 0 && ty < side as i32 {
                    let coverage = bitmap[sy * metrics.width + sx];
                    img.put_pixel(tx as u32, ty as u32, Rgba([0, 0, 0, coverage]));
                }
            }
        }

        Ok(img)
    }
}
