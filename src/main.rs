//! glyphgrid CLI - Convert images to character grids

use clap::Parser;
use glyphgrid::raster::{FontRasterizer, ScaledSurface, FOOTPRINT};
use glyphgrid::source::FileSource;
use glyphgrid::{ColorMode, GlyphgridError, PaletteMetric, Pipeline, RenderConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glyphgrid", about = "Convert images to character grids")]
struct Args {
    /// Input image file
    input: PathBuf,
    /// Monospace font used to profile the character set
    #[arg(short, long, default_value = "assets/DejaVuSansMono.ttf")]
    font: PathBuf,
    /// TOML config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output width in characters
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(10..=150))]
    width: Option<u32>,
    /// Density samples per cell side
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=3))]
    sample_resolution: Option<u32>,
    /// Candidate characters, in tie-break order
    #[arg(long)]
    charset: Option<String>,
    #[arg(long, allow_hyphen_values = true, value_parser = unit_range)]
    contrast: Option<f32>,
    #[arg(long, allow_hyphen_values = true, value_parser = unit_range)]
    brightness: Option<f32>,
    /// Added to each cell's alpha
    #[arg(long, allow_hyphen_values = true, value_parser = unit_range)]
    alpha: Option<f32>,
    /// monochrome, full-color, grey-2, grey-4, grey-8, color-3 or color-4
    #[arg(short, long)]
    palette: Option<ColorMode>,
    /// signed-sum or manhattan
    #[arg(long)]
    metric: Option<PaletteMetric>,
    /// Emit 24-bit ANSI colors
    #[arg(long, conflicts_with = "json")]
    ansi: bool,
    /// Emit the cell grid as JSON
    #[arg(long)]
    json: bool,
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn unit_range(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (-1.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is not within -1..=1"))
    }
}

fn main() -> Result<(), GlyphgridError> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(s) = args.sample_resolution {
        config.sample_resolution = s;
    }
    if let Some(charset) = args.charset {
        config.charset = charset;
    }
    if let Some(contrast) = args.contrast {
        config.contrast = contrast;
    }
    if let Some(brightness) = args.brightness {
        config.brightness = brightness;
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(palette) = args.palette {
        config.palette = palette;
    }
    if let Some(metric) = args.metric {
        config.palette_metric = metric;
    }
    config.source = Some(args.input.to_string_lossy().into_owned());
    config.validate()?;

    let rasterizer = FontRasterizer::from_file(&args.font, FOOTPRINT)?;
    let mut pipeline = Pipeline::new(rasterizer, ScaledSurface::new());
    pipeline.apply(config)?;
    pipeline.load_with(&FileSource::new())?;

    let Some(frame) = pipeline.frame() else {
        return Err(GlyphgridError::SourceUnavailable(args.input.display().to_string()));
    };
    log::info!("rendered {}x{} cells", frame.width, frame.height);

    if args.json {
        println!("{}", frame.to_json()?);
    } else if args.ansi {
        print!("{}", frame.to_ansi());
    } else {
        print!("{}", frame.to_text());
    }
    Ok(())
}
