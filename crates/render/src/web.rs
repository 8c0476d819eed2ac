//! `CanvasRenderingContext2d` backed [`Canvas`].

use std::collections::HashMap;

use foundation::bounds::Aabb2;
use foundation::math::Vec2;
use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::canvas::{Canvas, Stroke};

pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
}

impl WebCanvas {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            images: HashMap::new(),
        }
    }

    /// Makes a loaded image drawable under `url`.
    pub fn register_image(&mut self, url: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(url.into(), image);
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Canvas for WebCanvas {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clear(&mut self, region: Aabb2) {
        self.ctx
            .clear_rect(region.min[0], region.min[1], region.width(), region.height());
    }

    fn draw_image(&mut self, url: &str, src: Aabb2, dst: Aabb2) {
        let Some(image) = self.images.get(url) else {
            debug!(url, "image not registered; skipped");
            return;
        };
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                src.min[0],
                src.min[1],
                src.width(),
                src.height(),
                dst.min[0],
                dst.min[1],
                dst.width(),
                dst.height(),
            );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, fill: &str, stroke: Option<&Stroke>) {
        set_style(&self.ctx, "fillStyle", fill);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
        if let Some(stroke) = stroke {
            set_style(&self.ctx, "strokeStyle", &stroke.color);
            self.ctx.set_line_width(stroke.width);
            self.ctx.stroke();
        }
    }
}

fn set_style(ctx: &CanvasRenderingContext2d, property: &str, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str(property),
        &JsValue::from_str(value),
    );
}
