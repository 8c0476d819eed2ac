//! Scaled screen-space geometry shared by drawing and hit-testing.
//!
//! Both the render pass and the hit tester go through [`MarkerGeometry`], so
//! the clickable box is always exactly the drawn box.

use foundation::bounds::Aabb2;
use foundation::math::Vec2;

/// Completion badge placement at natural scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BadgeSpec {
    /// Side of the (square) badge bitmap in pixels.
    pub size: f64,
    /// Distance from the pin point back to the badge's top-left corner.
    pub offset: f64,
}

/// Check badge drawn over raster icons.
pub const ICON_BADGE: BadgeSpec = BadgeSpec {
    size: 14.0,
    offset: 7.0,
};

/// Smaller check badge drawn over circle glyphs.
pub const CIRCLE_BADGE: BadgeSpec = BadgeSpec {
    size: 10.0,
    offset: 5.0,
};

/// A marker's geometry at one discrete scale, in integer pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerGeometry {
    pub scale: f64,
    /// Natural bitmap size (the source rectangle).
    pub natural_size: Vec2,
    /// `round(natural_size * scale)`.
    pub size: Vec2,
    /// `round(anchor * scale)`.
    pub anchor: Vec2,
    pub badge_size: f64,
    pub badge_offset: f64,
}

impl MarkerGeometry {
    pub fn new(natural_size: Vec2, natural_anchor: Vec2, badge: BadgeSpec, scale: f64) -> Self {
        Self {
            scale,
            natural_size,
            size: natural_size.scale(scale).round(),
            anchor: natural_anchor.scale(scale).round(),
            badge_size: (badge.size * scale).round(),
            badge_offset: (badge.offset * scale).round(),
        }
    }

    /// Integer top-left corner of the drawn glyph for pin point `pin`.
    pub fn top_left(&self, pin: Vec2) -> Vec2 {
        (pin - self.anchor).round()
    }

    /// Drawn glyph rectangle.
    pub fn glyph_bounds(&self, pin: Vec2) -> Aabb2 {
        Aabb2::from_origin_size(self.top_left(pin), self.size)
    }

    /// Drawn badge rectangle; the badge is centred near the pin point.
    pub fn badge_bounds(&self, pin: Vec2) -> Aabb2 {
        let origin = Vec2::new(pin.x - self.badge_offset, pin.y - self.badge_offset).round();
        Aabb2::from_origin_size(origin, Vec2::new(self.badge_size, self.badge_size))
    }

    /// Pointer containment against the drawn glyph.
    ///
    /// The box is centred on the visual glyph: the pin point shifted by
    /// `half_size - anchor`. The leading edges are inclusive and the trailing
    /// edges exclusive, so exactly the `size.x * size.y` drawn pixels hit.
    pub fn contains(&self, pin: Vec2, pointer: Vec2) -> bool {
        let half = self.size.scale(0.5);
        let center = self.top_left(pin) + half;
        pointer.x >= center.x - half.x
            && pointer.x < center.x + half.x
            && pointer.y >= center.y - half.y
            && pointer.y < center.y + half.y
    }
}

#[cfg(test)]
mod tests {
    use super::{ICON_BADGE, MarkerGeometry};
    use foundation::bounds::Aabb2;
    use foundation::math::Vec2;

    fn geom(scale: f64) -> MarkerGeometry {
        MarkerGeometry::new(Vec2::new(25.0, 41.0), Vec2::new(13.0, 21.0), ICON_BADGE, scale)
    }

    #[test]
    fn sizes_round_to_nearest_pixel() {
        let g = geom(0.75);
        // 18.75 -> 19, 30.75 -> 31, 9.75 -> 10, 15.75 -> 16
        assert_eq!(g.size, Vec2::new(19.0, 31.0));
        assert_eq!(g.anchor, Vec2::new(10.0, 16.0));
        assert_eq!(g.badge_size, 11.0);
        assert_eq!(g.badge_offset, 5.0);
    }

    #[test]
    fn glyph_bounds_follow_anchor() {
        let g = geom(1.0);
        let b = g.glyph_bounds(Vec2::new(100.4, 200.6));
        assert_eq!(b, Aabb2::new([87.0, 180.0], [112.0, 221.0]));
    }

    #[test]
    fn hit_box_matches_drawn_pixels() {
        for scale in [0.5, 1.0, 1.25, 2.0] {
            let g = geom(scale);
            let pin = Vec2::new(64.3, 80.8);
            let tl = g.top_left(pin);
            let br = tl + g.size;
            assert!(g.contains(pin, tl));
            assert!(g.contains(pin, br - Vec2::new(1.0, 1.0)));
            assert!(!g.contains(pin, Vec2::new(tl.x - 1.0, tl.y)));
            assert!(!g.contains(pin, Vec2::new(tl.x, tl.y - 1.0)));
            assert!(!g.contains(pin, Vec2::new(br.x, tl.y)));
            assert!(!g.contains(pin, Vec2::new(tl.x, br.y)));
        }
    }

    #[test]
    fn badge_scales_with_marker() {
        let g = geom(2.0);
        let b = g.badge_bounds(Vec2::new(50.0, 50.0));
        assert_eq!(b, Aabb2::new([36.0, 36.0], [64.0, 64.0]));
    }
}
