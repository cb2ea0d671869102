//! WebAssembly bindings for glyphgrid
//!
//! The host page owns the canvas: it draws each glyph and decodes each source
//! image, then passes the raw RGBA buffers in.

use crate::raster::{rgba_from_raw, GlyphRasterizer, ScaledSurface, FOOTPRINT};
use crate::{ColorMode, GlyphgridError, Pipeline, RenderConfig};
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Glyph rasters supplied by the host, shared with the converter.
#[derive(Clone)]
struct HostGlyphs {
    rasters: Rc<RefCell<HashMap<char, RgbaImage>>>,
}

impl GlyphRasterizer for HostGlyphs {
    fn footprint(&self) -> u32 {
        FOOTPRINT
    }

    fn rasterize(&self, ch: char) -> crate::Result<RgbaImage> {
        self.rasters
            .borrow()
            .get(&ch)
            .cloned()
            .ok_or_else(|| GlyphgridError::Surface(format!("no raster supplied for {ch:?}")))
    }
}

fn js_err(e: GlyphgridError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmConverter {
    glyphs: HostGlyphs,
    pipeline: Pipeline<HostGlyphs, ScaledSurface>,
}

#[wasm_bindgen]
impl WasmConverter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmConverter {
        let glyphs = HostGlyphs { rasters: Rc::new(RefCell::new(HashMap::new())) };
        let pipeline = Pipeline::new(glyphs.clone(), ScaledSurface::new());
        WasmConverter { glyphs, pipeline }
    }

    /// Side length of the square each glyph must be drawn on.
    #[wasm_bindgen]
    pub fn footprint(&self) -> u32 {
        FOOTPRINT
    }

    /// Store the `footprint × footprint` RGBA raster of one character.
    #[wasm_bindgen]
    pub fn set_glyph(&mut self, ch: String, data: &[u8]) -> Result<(), JsValue> {
        let ch = ch.chars().next().ok_or_else(|| JsValue::from_str("empty glyph"))?;
        let raster = rgba_from_raw(FOOTPRINT, FOOTPRINT, data.to_vec()).map_err(js_err)?;
        self.glyphs.rasters.borrow_mut().insert(ch, raster);
        Ok(())
    }

    /// Apply a whole configuration given as a JSON object.
    #[wasm_bindgen]
    pub fn configure(&mut self, json: &str) -> Result<(), JsValue> {
        let config: RenderConfig = serde_json::from_str(json)
            .map_err(|e| js_err(GlyphgridError::Config(e.to_string())))?;
        self.apply(config)
    }

    #[wasm_bindgen]
    pub fn set_charset(&mut self, charset: String) -> Result<(), JsValue> {
        self.update(|c| c.charset = charset)
    }

    #[wasm_bindgen]
    pub fn set_sample_resolution(&mut self, s: u32) -> Result<(), JsValue> {
        self.update(|c| c.sample_resolution = s)
    }

    #[wasm_bindgen]
    pub fn set_width(&mut self, width: u32) -> Result<(), JsValue> {
        self.update(|c| c.width = width)
    }

    #[wasm_bindgen]
    pub fn set_contrast(&mut self, contrast: f32) -> Result<(), JsValue> {
        self.update(|c| c.contrast = contrast)
    }

    #[wasm_bindgen]
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), JsValue> {
        self.update(|c| c.brightness = brightness)
    }

    #[wasm_bindgen]
    pub fn set_alpha(&mut self, alpha: f32) -> Result<(), JsValue> {
        self.update(|c| c.alpha = alpha)
    }

    #[wasm_bindgen]
    pub fn set_palette(&mut self, name: &str) -> Result<(), JsValue> {
        let palette: ColorMode = name.parse().map_err(js_err)?;
        self.update(|c| c.palette = palette)
    }

    #[wasm_bindgen]
    pub fn set_source(&mut self, id: String) -> Result<(), JsValue> {
        self.update(|c| c.source = Some(id))
    }

    /// Deliver a decoded source image.
    #[wasm_bindgen]
    pub fn image_loaded(
        &mut self,
        id: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), JsValue> {
        let image = rgba_from_raw(width, height, data.to_vec());
        self.pipeline.complete_load(id, image).map(|_| ()).map_err(js_err)
    }

    /// Report that a source could not be fetched or decoded.
    #[wasm_bindgen]
    pub fn image_failed(&mut self, id: &str, reason: &str) -> Result<(), JsValue> {
        web_sys::console::warn_1(&format!("glyphgrid: {id}: {reason}").into());
        let failure = Err(GlyphgridError::SourceUnavailable(reason.to_string()));
        self.pipeline.complete_load(id, failure).map(|_| ()).map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn width(&self) -> u32 {
        self.pipeline.frame().map_or(0, |f| f.width)
    }

    #[wasm_bindgen]
    pub fn height(&self) -> u32 {
        self.pipeline.frame().map_or(0, |f| f.height)
    }

    /// Current cells as `{ ch, color }` objects; `color` is a CSS string or null.
    #[wasm_bindgen]
    pub fn cells(&self) -> Result<js_sys::Array, JsValue> {
        let out = js_sys::Array::new();
        let Some(frame) = self.pipeline.frame() else {
            return Ok(out);
        };
        for cell in &frame.cells {
            let obj = js_sys::Object::new();
            js_sys::Reflect::set(&obj, &"ch".into(), &cell.ch.to_string().into())?;
            let color = match cell.color {
                Some(c) => JsValue::from_str(&c.to_string()),
                None => JsValue::NULL,
            };
            js_sys::Reflect::set(&obj, &"color".into(), &color)?;
            out.push(&obj);
        }
        Ok(out)
    }
}

impl WasmConverter {
    fn update(&mut self, change: impl FnOnce(&mut RenderConfig)) -> Result<(), JsValue> {
        let mut config = self.pipeline.config().clone();
        change(&mut config);
        self.apply(config)
    }

    fn apply(&mut self, config: RenderConfig) -> Result<(), JsValue> {
        config.validate().map_err(js_err)?;
        self.pipeline.apply(config).map(|_| ()).map_err(js_err)
    }
}

impl Default for WasmConverter {
    fn default() -> Self {
        Self::new()
    }
}
