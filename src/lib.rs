//! Image to character-grid converter using glyph density profiles.
//!
//! Every character of a character set is rasterized and reduced to an `S×S`
//! ink-density vector. The source image is sampled into cells with the same
//! layout, both sides are normalized onto a shared scale, and each cell takes
//! the character with the nearest profile plus an optionally quantized color.

pub mod config;
pub mod frame;
pub mod glyph;
pub mod matcher;
pub mod normalize;
pub mod palette;
pub mod pipeline;
pub mod raster;
pub mod sample;
pub mod sampler;
pub mod source;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::RenderConfig;
pub use frame::{Cell, Frame};
pub use glyph::{GlyphProfiler, GlyphSet};
pub use matcher::Matcher;
pub use palette::{ColorMode, DisplayColor, PaletteMetric};
pub use pipeline::{Observer, Pipeline, Recompute};
pub use sampler::{Dimensions, ImageSampler, SampledImage};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlyphgridError {
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Character set is empty")]
    EmptyCharset,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GlyphgridError>;
