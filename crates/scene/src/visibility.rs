use foundation::bounds::Aabb2;
use foundation::math::Vec2;

use crate::geometry::MarkerGeometry;
use crate::marker::Marker;
use crate::viewport::Viewport;

/// Extra margin around a marker's drawn box when culling, so glyphs sliding
/// in during a pan are already painted.
pub const DEFAULT_CULL_PADDING_PX: f64 = 50.0;

/// Everything a marker may paint (glyph and badge), grown by `padding`.
pub fn pixel_bounds(geometry: &MarkerGeometry, pin: Vec2, padding: f64) -> Aabb2 {
    geometry
        .glyph_bounds(pin)
        .union(geometry.badge_bounds(pin))
        .pad(padding)
}

/// Whether `marker`, drawn at `pin`, can touch the visible canvas.
///
/// Markers that are not drawable yet are never visible.
pub fn is_visible(marker: &Marker, pin: Vec2, viewport: &dyn Viewport, padding: f64) -> bool {
    match marker.geometry() {
        Some(geometry) => viewport.visible_bounds_intersects(&pixel_bounds(&geometry, pin, padding)),
        None => false,
    }
}
