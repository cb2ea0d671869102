//! Immutable render configuration snapshot.

use crate::palette::{ColorMode, PaletteMetric};
use crate::pipeline::Recompute;
use crate::{GlyphgridError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Printable ASCII, space through tilde.
pub const DEFAULT_CHARSET: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// One complete set of user inputs.
///
/// The pipeline keeps the current snapshot and diffs each new one against it
/// to decide how much work a change needs.
///
/// # Example
/// ```
/// use glyphgrid::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.sample_resolution, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Candidate characters, in tie-break order.
    pub charset: String,
    /// Side of the density grid per glyph and per cell.
    pub sample_resolution: u32,
    /// Output width in characters.
    pub width: u32,
    /// [-1, 1]
    pub contrast: f32,
    /// [-1, 1]
    pub brightness: f32,
    /// Added to every cell's alpha, [-1, 1].
    pub alpha: f32,
    pub palette: ColorMode,
    pub palette_metric: PaletteMetric,
    /// Identifier of the selected source image.
    pub source: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            sample_resolution: 1,
            width: 80,
            contrast: 0.0,
            brightness: 0.0,
            alpha: 0.0,
            palette: ColorMode::FullColor,
            palette_metric: PaletteMetric::SignedSum,
            source: None,
        }
    }
}

impl RenderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks for inputs coming from outside the pipeline.
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.sample_resolution) {
            return Err(GlyphgridError::Config(format!(
                "sample_resolution must be within 1..=3, got {}",
                self.sample_resolution
            )));
        }
        if !(10..=150).contains(&self.width) {
            return Err(GlyphgridError::Config(format!(
                "width must be within 10..=150, got {}",
                self.width
            )));
        }
        for (name, value) in [
            ("contrast", self.contrast),
            ("brightness", self.brightness),
            ("alpha", self.alpha),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(GlyphgridError::Config(format!(
                    "{name} must be within -1..=1, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Cheapest recomputation that brings output made with `previous` up to
    /// date with `self`.
    pub fn recompute_level(&self, previous: &RenderConfig) -> Recompute {
        if self.charset != previous.charset || self.sample_resolution != previous.sample_resolution
        {
            Recompute::Full
        } else if self.source != previous.source || self.width != previous.width {
            Recompute::Image
        } else if self.contrast != previous.contrast || self.brightness != previous.brightness {
            Recompute::Tone
        } else if self.palette != previous.palette
            || self.palette_metric != previous.palette_metric
            || self.alpha != previous.alpha
        {
            Recompute::Presentation
        } else {
            Recompute::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn levels_pick_the_cheapest_sufficient_pass() {
        let base = RenderConfig::default();
        let with = |f: fn(&mut RenderConfig)| {
            let mut c = base.clone();
            f(&mut c);
            c.recompute_level(&base)
        };

        assert_eq!(base.recompute_level(&base), Recompute::None);
        assert_eq!(with(|c| c.sample_resolution = 2), Recompute::Full);
        assert_eq!(with(|c| c.charset = " #".into()), Recompute::Full);
        assert_eq!(with(|c| c.width = 40), Recompute::Image);
        assert_eq!(with(|c| c.source = Some("cat.png".into())), Recompute::Image);
        assert_eq!(with(|c| c.brightness = 0.2), Recompute::Tone);
        assert_eq!(with(|c| c.contrast = -0.2), Recompute::Tone);
        assert_eq!(with(|c| c.alpha = 0.2), Recompute::Presentation);
        assert_eq!(with(|c| c.palette = ColorMode::Grey4), Recompute::Presentation);
        assert_eq!(with(|c| c.palette_metric = PaletteMetric::Manhattan), Recompute::Presentation);
    }

    #[test]
    fn combined_changes_take_the_strongest_level() {
        let base = RenderConfig::default();
        let mut next = base.clone();
        next.brightness = 0.5;
        next.sample_resolution = 3;
        assert_eq!(next.recompute_level(&base), Recompute::Full);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = RenderConfig::from_toml(
            "sample_resolution = 2\npalette = \"grey-4\"\npalette_metric = \"manhattan\"\n",
        )
        .unwrap();
        assert_eq!(config.sample_resolution, 2);
        assert_eq!(config.palette, ColorMode::Grey4);
        assert_eq!(config.palette_metric, PaletteMetric::Manhattan);
        assert_eq!(config.width, 80);
        assert_eq!(config.charset, DEFAULT_CHARSET);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            RenderConfig::from_toml("sample_resolution = 4"),
            Err(GlyphgridError::Config(_))
        ));
        assert!(matches!(RenderConfig::from_toml("width = 5"), Err(GlyphgridError::Config(_))));
        assert!(matches!(RenderConfig::from_toml("alpha = 1.5"), Err(GlyphgridError::Config(_))));
        assert!(matches!(RenderConfig::from_toml("width = \"wide\""), Err(GlyphgridError::Toml(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = 120\ncontrast = 0.25\nsource = \"photo.png\"").unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.width, 120);
        assert_eq!(config.contrast, 0.25);
        assert_eq!(config.source.as_deref(), Some("photo.png"));
    }
}
