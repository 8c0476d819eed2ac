use foundation::bounds::Aabb2;
use foundation::math::{LatLng, Vec2};

/// The map viewport as seen by markers: projection, zoom and the visible
/// pixel region. Supplied by the embedding map.
pub trait Viewport {
    /// Container pixel of a logical position.
    fn project_to_pixel(&self, position: LatLng) -> Vec2;

    /// `None` while the map has no zoom yet.
    fn current_zoom(&self) -> Option<f64>;

    /// Whether `bounds` (container pixels) overlaps the visible canvas.
    fn visible_bounds_intersects(&self, bounds: &Aabb2) -> bool;
}

/// Equirectangular viewport: `pixels_per_degree` doubles per zoom level.
///
/// Enough of a map for headless embeddings and tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineViewport {
    /// Logical position at container pixel `(0, 0)`.
    pub origin: LatLng,
    pub zoom: Option<f64>,
    /// Pixels per degree at zoom 0.
    pub base_pixels_per_degree: f64,
    /// Container size in pixels.
    pub size: Vec2,
}

impl AffineViewport {
    pub fn new(origin: LatLng, zoom: f64, size: Vec2) -> Self {
        Self {
            origin,
            zoom: Some(zoom),
            base_pixels_per_degree: 1.0,
            size,
        }
    }

    pub fn pixels_per_degree(&self) -> f64 {
        self.base_pixels_per_degree * 2f64.powf(self.zoom.unwrap_or(0.0))
    }

    pub fn pixel_bounds(&self) -> Aabb2 {
        Aabb2::from_origin_size(Vec2::ZERO, self.size)
    }
}

impl Viewport for AffineViewport {
    fn project_to_pixel(&self, position: LatLng) -> Vec2 {
        let ppd = self.pixels_per_degree();
        Vec2::new(
            (position.lng - self.origin.lng) * ppd,
            (self.origin.lat - position.lat) * ppd,
        )
    }

    fn current_zoom(&self) -> Option<f64> {
        self.zoom
    }

    fn visible_bounds_intersects(&self, bounds: &Aabb2) -> bool {
        self.pixel_bounds().intersects(bounds)
    }
}
