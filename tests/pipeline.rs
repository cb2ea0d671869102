use glyphgrid::raster::{DrawSurface, GlyphRasterizer, ScaledSurface, FOOTPRINT};
use glyphgrid::source::{BackgroundLoader, ImageSource};
use glyphgrid::{ColorMode, GlyphgridError, Observer, Pipeline, Recompute, RenderConfig};
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Inks the top rows of the footprint: ' ' none, '@' all.
struct RowRasterizer;

impl GlyphRasterizer for RowRasterizer {
    fn footprint(&self) -> u32 {
        FOOTPRINT
    }

    fn rasterize(&self, ch: char) -> glyphgrid::Result<RgbaImage> {
        let rows = match ch {
            ' ' => 0,
            '.' => 3,
            ':' => 6,
            '#' => 9,
            _ => 12,
        };
        Ok(RgbaImage::from_fn(FOOTPRINT, FOOTPRINT, |_, y| {
            Rgba([0, 0, 0, if y < rows { 255 } else { 0 }])
        }))
    }
}

/// White on the left fading to black on the right, red tinted on top.
fn gradient() -> RgbaImage {
    RgbaImage::from_fn(40, 20, |x, y| {
        let v = 255 - (x * 255 / 39) as u8;
        let r = if y < 10 { v.saturating_add(40) } else { v };
        Rgba([r, v, v, 255])
    })
}

fn checker() -> RgbaImage {
    RgbaImage::from_fn(60, 60, |x, y| {
        if (x / 6 + y / 6) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn config(source: &str) -> RenderConfig {
    RenderConfig {
        charset: " .:#@".into(),
        width: 10,
        source: Some(source.into()),
        ..RenderConfig::default()
    }
}

fn loaded(source: &str, image: RgbaImage) -> Pipeline<RowRasterizer, ScaledSurface> {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.apply(config(source)).unwrap();
    pipeline.complete_load(source, Ok(image)).unwrap();
    pipeline
}

#[test]
fn first_frame_waits_for_the_image() {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    assert_eq!(pipeline.apply(config("grad")).unwrap(), Recompute::Full);
    assert!(pipeline.glyphs().is_some());
    assert!(pipeline.frame().is_none());

    assert_eq!(pipeline.complete_load("grad", Ok(gradient())).unwrap(), Recompute::Image);
    let frame = pipeline.frame().unwrap();
    assert_eq!((frame.width, frame.height), (10, 2));
    assert_eq!(frame.cells.len(), 20);
}

#[test]
fn light_to_dark_maps_sparse_to_dense() {
    let pipeline = loaded("grad", gradient());
    let frame = pipeline.frame().unwrap();
    for row in frame.rows() {
        assert_eq!(row[0].ch, ' ');
        assert_eq!(row[9].ch, '@');
    }
}

#[test]
fn brightness_only_reruns_tone() {
    let mut pipeline = loaded("grad", gradient());
    let sampled = pipeline.sampled().unwrap().clone();
    let normalized = pipeline.normalized().unwrap().to_vec();

    let mut next = pipeline.config().clone();
    next.brightness = 0.4;
    assert_eq!(pipeline.apply(next).unwrap(), Recompute::Tone);

    assert_eq!(pipeline.sampled().unwrap(), &sampled);
    assert_ne!(pipeline.normalized().unwrap(), normalized.as_slice());
}

#[test]
fn palette_change_only_requantizes() {
    let mut pipeline = loaded("grad", gradient());
    let normalized = pipeline.normalized().unwrap().to_vec();
    let chars: Vec<char> = pipeline.frame().unwrap().cells.iter().map(|c| c.ch).collect();

    let mut next = pipeline.config().clone();
    next.palette = ColorMode::Monochrome;
    assert_eq!(pipeline.apply(next).unwrap(), Recompute::Presentation);

    let frame = pipeline.frame().unwrap();
    assert!(frame.cells.iter().all(|c| c.color.is_none()));
    assert_eq!(frame.cells.iter().map(|c| c.ch).collect::<Vec<_>>(), chars);
    assert_eq!(pipeline.normalized().unwrap(), normalized.as_slice());
}

#[test]
fn grey_palette_snaps_colors() {
    let mut pipeline = loaded("grad", gradient());
    let mut next = pipeline.config().clone();
    next.palette = ColorMode::Grey2;
    pipeline.apply(next).unwrap();

    let levels = [85u8, 170, 255];
    for cell in &pipeline.frame().unwrap().cells {
        let c = cell.color.unwrap();
        assert!(c.r == c.g && c.g == c.b);
        assert!(levels.contains(&c.r), "{c}");
    }
}

#[test]
fn sample_resolution_change_rebuilds_everything() {
    let mut pipeline = loaded("check", checker());
    let mut next = pipeline.config().clone();
    next.sample_resolution = 2;
    assert_eq!(pipeline.apply(next).unwrap(), Recompute::Full);

    assert_eq!(pipeline.glyphs().unwrap().sample_resolution(), 2);
    assert!(pipeline.glyphs().unwrap().profiles().iter().all(|p| p.len() == 4));
    assert!(pipeline.sampled().unwrap().values().iter().all(|v| v.len() == 4));
}

#[test]
fn unchanged_config_is_a_no_op() {
    let mut pipeline = loaded("grad", gradient());
    let same = pipeline.config().clone();
    assert_eq!(pipeline.apply(same).unwrap(), Recompute::None);
}

#[test]
fn failed_load_keeps_last_good_image() {
    let mut pipeline = loaded("a", gradient());
    let before = pipeline.frame().unwrap().clone();

    pipeline.apply(config("b")).unwrap();
    let failure = Err(GlyphgridError::SourceUnavailable("b".into()));
    assert_eq!(pipeline.complete_load("b", failure).unwrap(), Recompute::None);
    assert_eq!(pipeline.frame().unwrap(), &before);

    let mut next = pipeline.config().clone();
    next.contrast = 0.2;
    pipeline.apply(next).unwrap();
    assert_eq!(pipeline.sampled().unwrap().dims(), before.dims());
}

#[test]
fn failed_load_falls_back_to_latest_cached() {
    let mut pipeline = loaded("a", gradient());
    pipeline.apply(RenderConfig { source: None, ..pipeline.config().clone() }).unwrap();
    assert!(pipeline.frame().is_none());

    pipeline.apply(config("c")).unwrap();
    let failure = Err(GlyphgridError::SourceUnavailable("c".into()));
    assert_eq!(pipeline.complete_load("c", failure).unwrap(), Recompute::Image);
    assert_eq!(pipeline.frame().unwrap().dims(), loaded("a", gradient()).frame().unwrap().dims());
}

#[test]
fn failure_without_cache_produces_nothing() {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.apply(config("a")).unwrap();
    let failure = Err(GlyphgridError::SourceUnavailable("a".into()));
    assert_eq!(pipeline.complete_load("a", failure).unwrap(), Recompute::None);
    assert!(pipeline.frame().is_none());
}

#[test]
fn stale_completion_is_cached_but_ignored() {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.apply(config("a")).unwrap();
    pipeline.apply(config("b")).unwrap();

    assert_eq!(pipeline.complete_load("a", Ok(gradient())).unwrap(), Recompute::None);
    assert!(pipeline.frame().is_none());
    assert!(pipeline.cache().contains("a"));

    // Reselecting a cached source needs no load.
    assert_eq!(pipeline.apply(config("a")).unwrap(), Recompute::Image);
    assert!(pipeline.frame().is_some());
}

#[test]
fn identical_runs_are_byte_identical() {
    let first = loaded("check", checker());
    let second = loaded("check", checker());
    assert_eq!(first.frame(), second.frame());
    assert_eq!(
        first.frame().unwrap().to_json().unwrap(),
        second.frame().unwrap().to_json().unwrap()
    );
}

#[test]
fn empty_charset_is_rejected() {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    let result = pipeline.apply(RenderConfig { charset: String::new(), ..config("a") });
    assert!(matches!(result, Err(GlyphgridError::EmptyCharset)));
}

#[derive(Default)]
struct Counts {
    glyph_passes: usize,
    sampled_sizes: Vec<(u32, u32)>,
}

struct CountingObserver(Rc<RefCell<Counts>>);

impl Observer for CountingObserver {
    fn glyph_rasters(&mut self, chars: &[char], rasters: &[RgbaImage]) {
        assert_eq!(chars.len(), rasters.len());
        self.0.borrow_mut().glyph_passes += 1;
    }

    fn sampled_raster(&mut self, raster: &RgbaImage) {
        self.0.borrow_mut().sampled_sizes.push(raster.dimensions());
    }
}

#[test]
fn observer_sees_each_rebuild_once() {
    let counts = Rc::new(RefCell::new(Counts::default()));
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.set_observer(Box::new(CountingObserver(Rc::clone(&counts))));

    pipeline.apply(config("grad")).unwrap();
    pipeline.complete_load("grad", Ok(gradient())).unwrap();
    pipeline.apply(RenderConfig { brightness: 0.1, ..config("grad") }).unwrap();
    let level = pipeline
        .apply(RenderConfig { width: 20, brightness: 0.1, ..config("grad") })
        .unwrap();
    assert_eq!(level, Recompute::Image);

    let counts = counts.borrow();
    assert_eq!(counts.glyph_passes, 1);
    assert_eq!(counts.sampled_sizes, vec![(10, 2), (20, 5)]);
}

/// Hands back a surface half as wide as requested.
struct HalfSurface;

impl DrawSurface for HalfSurface {
    fn draw(&self, _image: &RgbaImage, width: u32, height: u32) -> glyphgrid::Result<RgbaImage> {
        Ok(RgbaImage::new(width / 2, height))
    }
}

#[test]
fn short_draw_surface_fails_the_load() {
    let mut pipeline = Pipeline::new(RowRasterizer, HalfSurface);
    pipeline.apply(config("a")).unwrap();
    let result = pipeline.complete_load("a", Ok(gradient()));
    assert!(matches!(result, Err(GlyphgridError::Surface(_))));
    assert!(pipeline.frame().is_none());
}

struct MemorySource;

impl ImageSource for MemorySource {
    fn load(&self, id: &str) -> glyphgrid::Result<RgbaImage> {
        match id {
            "grad" => Ok(gradient()),
            _ => Err(GlyphgridError::SourceUnavailable(id.into())),
        }
    }
}

#[test]
fn background_loads_drive_the_pipeline() {
    let loader = BackgroundLoader::new(MemorySource);
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.apply(config("grad")).unwrap();
    loader.request("grad");

    let mut level = Recompute::None;
    for _ in 0..200 {
        level = pipeline.poll(&loader).unwrap();
        if level != Recompute::None {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(level, Recompute::Image);
    assert!(pipeline.frame().is_some());
}

#[test]
fn synchronous_load_uses_the_source_once() {
    let mut pipeline = Pipeline::new(RowRasterizer, ScaledSurface::new());
    pipeline.apply(config("grad")).unwrap();
    assert_eq!(pipeline.load_with(&MemorySource).unwrap(), Recompute::Image);
    assert_eq!(pipeline.load_with(&MemorySource).unwrap(), Recompute::None);
}
