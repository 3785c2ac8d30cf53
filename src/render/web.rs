//! Browser raster backend over `CanvasRenderingContext2d`.
//!
//! The same context type backs the screen-aligned preview overlay and the
//! offscreen canvases the host uploads as wall textures.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::error::RenderError;
use crate::implement::{LineCap, LineJoin, Shadow};
use crate::render::RasterContext;

fn backend_error(err: &JsValue) -> RenderError {
    RenderError::Backend(format!("{err:?}"))
}

impl RasterContext for CanvasRenderingContext2d {
    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, width, height);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        CanvasRenderingContext2d::set_line_cap(self, cap.as_str());
    }

    fn set_line_join(&mut self, join: LineJoin) {
        CanvasRenderingContext2d::set_line_join(self, join.as_str());
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        let dash_array = js_sys::Array::new();
        for segment in segments {
            dash_array.push(&JsValue::from_f64(*segment));
        }
        CanvasRenderingContext2d::set_line_dash(self, &dash_array).map_err(|e| backend_error(&e))
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        match shadow {
            Some(s) => {
                self.set_shadow_blur(s.blur);
                self.set_shadow_offset_x(s.offset_x);
                self.set_shadow_offset_y(s.offset_y);
                self.set_shadow_color(s.color);
            }
            None => {
                self.set_shadow_blur(0.0);
                self.set_shadow_offset_x(0.0);
                self.set_shadow_offset_y(0.0);
                self.set_shadow_color("transparent");
            }
        }
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), RenderError> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end).map_err(|e| backend_error(&e))
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }
}
