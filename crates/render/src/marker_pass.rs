//! The shared-canvas marker pass.
//!
//! Markers are drawn one after another into a single [`Canvas`]; later draws
//! occlude earlier ones and there is no other z-ordering.

use foundation::bounds::Aabb2;
use foundation::math::Vec2;
use runtime::Frame;
use scene::marker::CIRCLE_RADIUS_PX;
use scene::visibility::{DEFAULT_CULL_PADDING_PX, is_visible};
use scene::{EntityId, Glyph, Marker, Viewport, World};
use tracing::trace;

use crate::canvas::{Canvas, Stroke};

/// Check badge bitmap for raster icons.
pub const CHECK_ICON_URL: &str = "/assets/img/check.png";
/// Smaller check badge bitmap for circle glyphs.
pub const CHECK_CIRCLE_URL: &str = "/assets/img/check2.png";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// Outside the visible canvas (after padding).
    Culled,
    /// Icon not loaded yet; treated as empty.
    NotReady,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub culled: usize,
    pub not_ready: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRenderer {
    pub cull_padding_px: f64,
    pub check_icon_url: String,
    pub check_circle_url: String,
    pub circle_stroke: Stroke,
}

impl Default for MarkerRenderer {
    fn default() -> Self {
        Self {
            cull_padding_px: DEFAULT_CULL_PADDING_PX,
            check_icon_url: CHECK_ICON_URL.to_string(),
            check_circle_url: CHECK_CIRCLE_URL.to_string(),
            circle_stroke: Stroke {
                color: "#000000".to_string(),
                width: 1.0,
            },
        }
    }
}

impl MarkerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cull_padding(mut self, padding_px: f64) -> Self {
        self.cull_padding_px = padding_px;
        self
    }

    /// Draws one marker with its pin point at `pin`.
    pub fn draw(
        &self,
        ctx: &mut dyn Canvas,
        marker: &Marker,
        pin: Vec2,
        viewport: &dyn Viewport,
    ) -> DrawOutcome {
        let Some(geometry) = marker.geometry() else {
            return DrawOutcome::NotReady;
        };
        if !is_visible(marker, pin, viewport, self.cull_padding_px) {
            return DrawOutcome::Culled;
        }

        ctx.save();
        match marker.glyph() {
            Glyph::Icon { url } => {
                // Full natural source rect, so non-square icons keep their aspect.
                let src = Aabb2::from_origin_size(Vec2::ZERO, geometry.natural_size);
                ctx.draw_image(url, src, geometry.glyph_bounds(pin));
            }
            Glyph::Circle { color } => {
                let center = geometry.top_left(pin) + geometry.anchor;
                let radius = (CIRCLE_RADIUS_PX * geometry.scale).round();
                ctx.fill_circle(center, radius, color, Some(&self.circle_stroke));
            }
        }
        if marker.is_completed() {
            let badge = marker.glyph().badge();
            let url = match marker.glyph() {
                Glyph::Icon { .. } => &self.check_icon_url,
                Glyph::Circle { .. } => &self.check_circle_url,
            };
            let src = Aabb2::from_origin_size(Vec2::ZERO, Vec2::new(badge.size, badge.size));
            ctx.draw_image(url, src, geometry.badge_bounds(pin));
        }
        ctx.restore();
        DrawOutcome::Drawn
    }

    /// One full pass over `world` in paint order.
    ///
    /// Each accepted marker is re-projected before drawing. Callers clear the
    /// canvas beforehand.
    pub fn draw_world<F>(
        &self,
        ctx: &mut dyn Canvas,
        world: &mut World,
        viewport: &dyn Viewport,
        frame: Frame,
        mut filter: F,
    ) -> FrameStats
    where
        F: FnMut(EntityId, &Marker) -> bool,
    {
        let mut stats = FrameStats::default();
        let order: Vec<EntityId> = world.draw_order().to_vec();
        for entity in order {
            let Some(marker) = world.get_mut(entity) else {
                continue;
            };
            if !filter(entity, marker) {
                continue;
            }
            let pin = marker.project(viewport);
            match self.draw(ctx, marker, pin, viewport) {
                DrawOutcome::Drawn => stats.drawn += 1,
                DrawOutcome::Culled => stats.culled += 1,
                DrawOutcome::NotReady => stats.not_ready += 1,
            }
        }
        trace!(
            frame = frame.index,
            coalesced = frame.coalesced_requests,
            drawn = stats.drawn,
            culled = stats.culled,
            not_ready = stats.not_ready,
            "marker pass"
        );
        stats
    }
}
