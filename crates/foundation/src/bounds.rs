use crate::math::Vec2;

/// Axis-aligned bounding box in pixel space.
///
/// `min` is the top-left corner, `max` the bottom-right one. Both edges are
/// inclusive for [`Aabb2::intersects`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Box spanning `origin .. origin + size`.
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Aabb2::new([origin.x, origin.y], [origin.x + size.x, origin.y + size.y])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Grows the box by `pad` pixels on every side.
    pub fn pad(self, pad: f64) -> Self {
        Aabb2::new(
            [self.min[0] - pad, self.min[1] - pad],
            [self.max[0] + pad, self.max[1] + pad],
        )
    }

    pub fn union(self, other: Self) -> Self {
        Aabb2::new(
            [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        )
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min[0] <= other.max[0]
            && self.max[0] >= other.min[0]
            && self.min[1] <= other.max[1]
            && self.max[1] >= other.min[1]
    }
}
