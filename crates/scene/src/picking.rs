use foundation::math::Vec2;

use crate::World;
use crate::entity::EntityId;
use crate::marker::Marker;

/// Whether `pointer` (container pixels) falls on the drawn glyph.
///
/// A marker that is not projected yet, or whose icon has not loaded, hits
/// nothing.
pub fn contains(marker: &Marker, pointer: Vec2) -> bool {
    let (Some(pin), Some(geometry)) = (marker.projected(), marker.geometry()) else {
        return false;
    };
    geometry.contains(pin, pointer)
}

/// Topmost marker under `pointer` among those accepted by `filter`.
///
/// Ordering contract:
/// - Markers are visited in reverse paint order, so the one drawn last wins.
pub fn pick_screen<F>(world: &World, pointer: Vec2, mut filter: F) -> Option<EntityId>
where
    F: FnMut(EntityId, &Marker) -> bool,
{
    world.draw_order().iter().rev().copied().find(|&entity| {
        world
            .get(entity)
            .is_some_and(|m| filter(entity, m) && contains(m, pointer))
    })
}
