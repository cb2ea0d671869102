//! Recomputation controller.
//!
//! Holds the current configuration snapshot and every intermediate result.
//! A new snapshot is diffed against the current one and only the stages that
//! depend on what changed are re-run:
//!
//! | level          | glyph set | value/color map | normalized map + match | colors |
//! |----------------|-----------|-----------------|------------------------|--------|
//! | `Full`         | rebuild   | rebuild         | rebuild                | rebuild|
//! | `Image`        |           | rebuild         | rebuild                | rebuild|
//! | `Tone`         |           |                 | rebuild                | rebuild|
//! | `Presentation` |           |                 |                        | rebuild|
//!
//! Results are computed into locals and swapped in together, so a failed pass
//! leaves the previous snapshots untouched.

use crate::config::RenderConfig;
use crate::frame::{Cell, Frame};
use crate::glyph::{GlyphProfiler, GlyphSet};
use crate::matcher::Matcher;
use crate::normalize::normalize_values;
use crate::palette::Quantizer;
use crate::raster::{DrawSurface, GlyphRasterizer};
use crate::sampler::{ImageSampler, SampledImage};
use crate::source::{BackgroundLoader, ImageCache, ImageSource};
use crate::{GlyphgridError, Result};
use image::RgbaImage;
use std::sync::Arc;

/// How much of the pipeline a configuration change invalidates.
///
/// Ordered so that every level includes the work of the levels below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Recompute {
    None,
    Presentation,
    Tone,
    Image,
    Full,
}

/// Receives intermediate rasters after they are computed. Debug use only.
pub trait Observer {
    fn glyph_rasters(&mut self, _chars: &[char], _rasters: &[RgbaImage]) {}
    fn sampled_raster(&mut self, _raster: &RgbaImage) {}
}

pub struct Pipeline<R, D> {
    profiler: GlyphProfiler<R>,
    sampler: ImageSampler<D>,
    config: RenderConfig,
    cache: ImageCache,
    image: Option<Arc<RgbaImage>>,
    glyphs: Option<GlyphSet>,
    sampled: Option<SampledImage>,
    normalized: Option<Vec<Vec<f32>>>,
    matched: Option<Vec<char>>,
    frame: Option<Frame>,
    observer: Option<Box<dyn Observer>>,
}

impl<R: GlyphRasterizer, D: DrawSurface> Pipeline<R, D> {
    pub fn new(rasterizer: R, surface: D) -> Self {
        Self {
            profiler: GlyphProfiler::new(rasterizer),
            sampler: ImageSampler::new(surface),
            config: RenderConfig::default(),
            cache: ImageCache::new(),
            image: None,
            glyphs: None,
            sampled: None,
            normalized: None,
            matched: None,
            frame: None,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn Observer>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Last complete output, if any image has been processed yet.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn glyphs(&self) -> Option<&GlyphSet> {
        self.glyphs.as_ref()
    }

    pub fn sampled(&self) -> Option<&SampledImage> {
        self.sampled.as_ref()
    }

    pub fn normalized(&self) -> Option<&[Vec<f32>]> {
        self.normalized.as_deref()
    }

    /// Switch to a new configuration snapshot and recompute what it affects.
    ///
    /// A newly selected source that is not cached yet keeps the current image
    /// until [`Pipeline::complete_load`] delivers it.
    pub fn apply(&mut self, config: RenderConfig) -> Result<Recompute> {
        let level = if self.glyphs.is_none() {
            Recompute::Full
        } else {
            config.recompute_level(&self.config)
        };
        if level == Recompute::None {
            return Ok(level);
        }

        let mut image = self.image.clone();
        if config.source != self.config.source {
            match config.source.as_deref().map(|id| (id, self.cache.get(id))) {
                Some((_, Some(cached))) => image = Some(cached),
                Some((id, None)) => log::debug!("source '{id}' not loaded yet"),
                None => image = None,
            }
        }

        self.run(level, &config, image)?;
        self.config = config;
        Ok(level)
    }

    /// Feed the outcome of loading `id`.
    ///
    /// A success is always cached but only drives recomputation when `id` is
    /// the selected source. A failure of the selected source falls back to
    /// the most recently cached image; with nothing cached it is a no-op.
    pub fn complete_load(&mut self, id: &str, result: Result<RgbaImage>) -> Result<Recompute> {
        let selected = self.config.source.as_deref() == Some(id);
        let image = match result {
            Ok(decoded) => {
                let image = self.cache.insert(id, decoded);
                if !selected {
                    log::debug!("cached stale load of '{id}'");
                    return Ok(Recompute::None);
                }
                image
            }
            Err(e) => {
                log::warn!("failed to load '{id}': {e}");
                if !selected {
                    return Ok(Recompute::None);
                }
                let Some((fallback_id, fallback)) = self.cache.latest() else {
                    return Ok(Recompute::None);
                };
                if self.image.as_ref().is_some_and(|cur| Arc::ptr_eq(cur, &fallback)) {
                    return Ok(Recompute::None);
                }
                log::warn!("falling back to '{fallback_id}'");
                fallback
            }
        };

        let level = if self.glyphs.is_none() { Recompute::Full } else { Recompute::Image };
        let config = self.config.clone();
        self.run(level, &config, Some(image))?;
        Ok(level)
    }

    /// Load the selected source synchronously unless it is already cached.
    pub fn load_with(&mut self, source: &impl ImageSource) -> Result<Recompute> {
        let Some(id) = self.config.source.clone() else {
            return Ok(Recompute::None);
        };
        if self.cache.contains(&id) {
            return Ok(Recompute::None);
        }
        let result = source.load(&id);
        self.complete_load(&id, result)
    }

    /// Drain finished background loads, returning the strongest level run.
    pub fn poll<S>(&mut self, loader: &BackgroundLoader<S>) -> Result<Recompute>
    where
        S: ImageSource + Send + Sync + 'static,
    {
        let mut level = Recompute::None;
        while let Some(done) = loader.try_recv() {
            level = level.max(self.complete_load(&done.id, done.result)?);
        }
        Ok(level)
    }

    fn run(
        &mut self,
        level: Recompute,
        config: &RenderConfig,
        image: Option<Arc<RgbaImage>>,
    ) -> Result<()> {
        log::debug!("recompute {level:?}");
        let s = config.sample_resolution;

        let new_glyphs = if level >= Recompute::Full {
            let (glyphs, rasters) = self.profiler.build_set(&config.charset, s)?;
            if let Some(observer) = self.observer.as_mut() {
                observer.glyph_rasters(glyphs.chars(), &rasters);
            }
            Some(glyphs)
        } else {
            None
        };

        let new_sampled = if level >= Recompute::Image {
            Some(match image.as_deref() {
                Some(img) => {
                    let (sampled, raster) = self.sampler.sample(img, config.width, s)?;
                    if let (Some(observer), Some(raster)) = (self.observer.as_mut(), &raster) {
                        observer.sampled_raster(raster);
                    }
                    let dims = sampled.dims();
                    log::debug!("sampled {}x{} cells at s={s}", dims.width, dims.height);
                    Some(sampled)
                }
                None => None,
            })
        } else {
            None
        };
        let sampled = match &new_sampled {
            Some(rebuilt) => rebuilt.as_ref(),
            None => self.sampled.as_ref(),
        };

        let new_matched = match sampled {
            Some(sampled) if level >= Recompute::Tone => {
                let glyphs = new_glyphs
                    .as_ref()
                    .or(self.glyphs.as_ref())
                    .ok_or(GlyphgridError::EmptyCharset)?;
                debug_assert_eq!(
                    glyphs.sample_resolution(),
                    sampled.sample_resolution(),
                    "glyph set and value map sample resolutions differ"
                );
                let normalized =
                    normalize_values(sampled.values(), config.contrast, config.brightness);
                let matched = Matcher::new(glyphs)?.match_all(&normalized);
                Some(Some((normalized, matched)))
            }
            None if level >= Recompute::Tone => Some(None),
            _ => None,
        };
        let matched = match &new_matched {
            Some(rebuilt) => rebuilt.as_ref().map(|(_, m)| m.as_slice()),
            None => self.matched.as_deref(),
        };

        let frame = sampled.zip(matched).map(|(sampled, chars)| {
            let quantizer = Quantizer::new(config.palette, config.palette_metric, config.alpha);
            let cells = chars
                .iter()
                .zip(sampled.colors())
                .map(|(&ch, &rgba)| Cell { ch, color: quantizer.quantize(rgba) })
                .collect();
            Frame::new(sampled.dims(), cells)
        });

        if let Some(glyphs) = new_glyphs {
            log::debug!("glyph set rebuilt: {} chars at s={s}", glyphs.len());
            self.glyphs = Some(glyphs);
        }
        if let Some(sampled) = new_sampled {
            self.image = image;
            self.sampled = sampled;
        }
        if let Some(rebuilt) = new_matched {
            let (normalized, matched) = rebuilt.unzip();
            self.normalized = normalized;
            self.matched = matched;
        }
        self.frame = frame;
        Ok(())
    }
}
