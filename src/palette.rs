//! Color quantization against fixed palettes.

use crate::GlyphgridError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const COLOR_3BIT: [[u8; 3]; 8] = [
    [0, 0, 0],
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [0, 255, 255],
    [255, 0, 255],
    [255, 255, 255],
];

/// How cell colors are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// No color at all; the quantizer is bypassed.
    #[serde(rename = "monochrome")]
    Monochrome,
    #[default]
    #[serde(rename = "full-color")]
    FullColor,
    #[serde(rename = "grey-2")]
    Grey2,
    #[serde(rename = "grey-4")]
    Grey4,
    #[serde(rename = "grey-8")]
    Grey8,
    #[serde(rename = "color-3")]
    Color3,
    #[serde(rename = "color-4")]
    Color4,
}

impl ColorMode {
    pub const ALL: [ColorMode; 7] = [
        ColorMode::Monochrome,
        ColorMode::FullColor,
        ColorMode::Grey2,
        ColorMode::Grey4,
        ColorMode::Grey8,
        ColorMode::Color3,
        ColorMode::Color4,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Monochrome => "monochrome",
            ColorMode::FullColor => "full-color",
            ColorMode::Grey2 => "grey-2",
            ColorMode::Grey4 => "grey-4",
            ColorMode::Grey8 => "grey-8",
            ColorMode::Color3 => "color-3",
            ColorMode::Color4 => "color-4",
        }
    }

    /// Fixed palette entries, or `None` for the two bypass modes.
    pub fn palette(&self) -> Option<Vec<[u8; 3]>> {
        let grey = |levels: u32| -> Vec<[u8; 3]> {
            (0..levels)
                .map(|i| {
                    let v = (i * 255 / (levels - 1)) as u8;
                    [v, v, v]
                })
                .collect()
        };
        match self {
            ColorMode::Monochrome | ColorMode::FullColor => None,
            ColorMode::Grey2 => Some(grey(4)),
            ColorMode::Grey4 => Some(grey(16)),
            ColorMode::Grey8 => Some(grey(256)),
            ColorMode::Color3 => Some(COLOR_3BIT.to_vec()),
            ColorMode::Color4 => {
                let mut entries = COLOR_3BIT.to_vec();
                entries.extend((1..=7u8).map(|i| [i * 32, i * 32, i * 32]));
                Some(entries)
            }
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = GlyphgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMode::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| GlyphgridError::Config(format!("unknown palette '{s}'")))
    }
}

/// Distance used to pick the nearest palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteMetric {
    /// `|(r-pr) + (g-pg) + (b-pb)|`. Opposite channel errors cancel out.
    #[default]
    SignedSum,
    /// `|r-pr| + |g-pg| + |b-pb|`.
    Manhattan,
}

impl PaletteMetric {
    pub fn distance(&self, color: [u8; 3], entry: [u8; 3]) -> i32 {
        let d = |i: usize| color[i] as i32 - entry[i] as i32;
        match self {
            PaletteMetric::SignedSum => (d(0) + d(1) + d(2)).abs(),
            PaletteMetric::Manhattan => d(0).abs() + d(1).abs() + d(2).abs(),
        }
    }
}

impl FromStr for PaletteMetric {
    type Err = GlyphgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signed-sum" => Ok(PaletteMetric::SignedSum),
            "manhattan" => Ok(PaletteMetric::Manhattan),
            _ => Err(GlyphgridError::Config(format!("unknown palette metric '{s}'"))),
        }
    }
}

/// First palette entry with the strictly smallest distance.
pub fn nearest_color(palette: &[[u8; 3]], color: [u8; 3], metric: PaletteMetric) -> Option<[u8; 3]> {
    let mut best: Option<([u8; 3], i32)> = None;
    for &entry in palette {
        let dist = metric.distance(color, entry);
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((entry, dist));
        }
    }
    best.map(|(entry, _)| entry)
}

/// Final color of a cell as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl DisplayColor {
    /// Zero channels are emitted as 255, and alpha is clamped to [0, 1].
    pub fn new(rgb: [u8; 3], alpha: f32) -> Self {
        let channel = |v: u8| if v == 0 { 255 } else { v };
        Self {
            r: channel(rgb[0]),
            g: channel(rgb[1]),
            b: channel(rgb[2]),
            a: alpha.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Maps raw cell colors to display colors for one palette configuration.
#[derive(Debug, Clone)]
pub struct Quantizer {
    mode: ColorMode,
    metric: PaletteMetric,
    alpha_adjust: f32,
    entries: Option<Vec<[u8; 3]>>,
}

impl Quantizer {
    pub fn new(mode: ColorMode, metric: PaletteMetric, alpha_adjust: f32) -> Self {
        Self { mode, metric, alpha_adjust, entries: mode.palette() }
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// `None` in monochrome mode.
    pub fn quantize(&self, rgba: [u8; 4]) -> Option<DisplayColor> {
        if self.mode == ColorMode::Monochrome {
            return None;
        }
        let rgb = [rgba[0], rgba[1], rgba[2]];
        let rgb = match &self.entries {
            Some(entries) => nearest_color(entries, rgb, self.metric).unwrap_or(rgb),
            None => rgb,
        };
        Some(DisplayColor::new(rgb, rgba[3] as f32 / 255.0 + self.alpha_adjust))
    }
}
