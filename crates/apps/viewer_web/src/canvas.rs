//! `Canvas2d` over an off-screen `<canvas>` element.

use foundation::math::Vec2;
use layers::Canvas2d;
use scene::raster::Rgba;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement};

pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

fn css_color([r, g, b, a]: Rgba) -> String {
    format!("rgba({r},{g},{b},{})", a as f64 / 255.0)
}

impl WebCanvas {
    /// Detached canvas; it is never added to the page.
    pub fn new(width: u32, height: u32) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    /// RGBA8 pixels, row-major from the top-left.
    pub fn pixels(&self) -> Result<Vec<u8>, JsValue> {
        let (w, h) = self.size();
        let data = self
            .ctx
            .get_image_data(0.0, 0.0, w.max(1) as f64, h.max(1) as f64)?;
        Ok(data.data().0)
    }

    fn trace_rings(&self, rings: &[Vec<Vec2>]) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.begin_path();
        for ring in rings {
            let mut points = ring.iter();
            let Some(first) = points.next() else {
                continue;
            };
            self.ctx.move_to(first.x * w, first.y * h);
            for p in points {
                self.ctx.line_to(p.x * w, p.y * h);
            }
            self.ctx.close_path();
        }
    }
}

impl Canvas2d for WebCanvas {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Setting the size also resets the context state.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self, color: Rgba) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
        if color[3] > 0 {
            self.ctx.set_fill_style_str(&css_color(color));
            self.ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn fill_rings(&mut self, rings: &[Vec<Vec2>], color: Rgba) {
        self.trace_rings(rings);
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx
            .fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    }

    fn stroke_rings(&mut self, rings: &[Vec<Vec2>], line_width_px: f64, color: Rgba) {
        self.trace_rings(rings);
        self.ctx.set_line_width(line_width_px);
        self.ctx.set_line_join("round");
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.stroke();
    }
}
