//! Glyph profiling - reduces each character to an `S×S` ink-density vector.

use crate::normalize::normalize;
use crate::raster::GlyphRasterizer;
use crate::sample::{sample_positions, vector_len};
use crate::{GlyphgridError, Result};
use image::RgbaImage;

/// Density profile of one raster, `s*s` values in [0, 1], row-major.
///
/// The raster is split into `s×s` square sub-cells of `side / s` pixels
/// (truncated), and each value is the mean alpha of its sub-cell.
pub fn profile(raster: &RgbaImage, s: u32) -> Vec<f32> {
    let side = raster.width().min(raster.height());
    let sub = (side / s).max(1);
    let area = (sub * sub) as f32;

    sample_positions(s)
        .map(|(sx, sy)| {
            let mut sum = 0u32;
            for py in 0..sub {
                for px in 0..sub {
                    if let Some(p) = raster.get_pixel_checked(sx * sub + px, sy * sub + py) {
                        sum += p.0[3] as u32;
                    }
                }
            }
            sum as f32 / area / 255.0
        })
        .collect()
}

pub struct GlyphProfiler<R> {
    rasterizer: R,
}

impl<R: GlyphRasterizer> GlyphProfiler<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Rasterize every character, aborting on the first surface failure.
    pub fn rasterize_all(&self, chars: &[char]) -> Result<Vec<RgbaImage>> {
        let side = self.rasterizer.footprint();
        chars
            .iter()
            .map(|&c| {
                let raster = self.rasterizer.rasterize(c)?;
                if raster.dimensions() != (side, side) {
                    return Err(GlyphgridError::Surface(format!(
                        "raster for {c:?} is {}x{}, expected {side}x{side}",
                        raster.width(),
                        raster.height()
                    )));
                }
                Ok(raster)
            })
            .collect()
    }

    /// Profile `charset` at resolution `s`, returning the rasters alongside.
    pub fn build_set(&self, charset: &str, s: u32) -> Result<(GlyphSet, Vec<RgbaImage>)> {
        let chars: Vec<char> = charset.chars().collect();
        if chars.is_empty() {
            return Err(GlyphgridError::EmptyCharset);
        }
        let rasters = self.rasterize_all(&chars)?;
        Ok((GlyphSet::from_rasters(chars, &rasters, s), rasters))
    }
}

/// Raw and normalized profiles for an ordered character set.
///
/// Rebuilt wholesale whenever the character set or sample resolution changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSet {
    sample_resolution: u32,
    chars: Vec<char>,
    profiles: Vec<Vec<f32>>,
    normalized: Vec<Vec<f32>>,
}

impl GlyphSet {
    pub fn from_rasters(chars: Vec<char>, rasters: &[RgbaImage], s: u32) -> Self {
        let profiles: Vec<Vec<f32>> = rasters.iter().map(|r| profile(r, s)).collect();
        Self::from_profiles(chars, profiles, s)
    }

    /// Build from precomputed profiles.
    ///
    /// # Panics
    /// Panics if the counts differ or a profile is not `s*s` long.
    pub fn from_profiles(chars: Vec<char>, profiles: Vec<Vec<f32>>, s: u32) -> Self {
        assert_eq!(chars.len(), profiles.len(), "one profile per character");
        assert!(
            profiles.iter().all(|p| p.len() == vector_len(s)),
            "profile length must be s*s"
        );
        let normalized = normalize(&profiles);
        Self { sample_resolution: s, chars, profiles, normalized }
    }

    pub fn sample_resolution(&self) -> u32 {
        self.sample_resolution
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn profiles(&self) -> &[Vec<f32>] {
        &self.profiles
    }

    pub fn normalized(&self) -> &[Vec<f32>] {
        &self.normalized
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters paired with their normalized profiles, in charset order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[f32])> {
        self.chars.iter().copied().zip(self.normalized.iter().map(Vec::as_slice))
    }
}
