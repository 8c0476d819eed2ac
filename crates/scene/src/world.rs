use foundation::handles::Handle;
use foundation::ids::MarkerId;
use storage::CompletionStore;

use crate::entity::EntityId;
use crate::marker::Marker;

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    marker: Option<Marker>,
}

/// Arena of markers sharing one canvas.
///
/// Ordering contract:
/// - `iter_draw_order` yields markers in paint order; later entries occlude
///   earlier ones.
/// - New markers are appended; `bring_to_front` moves one to the end.
/// - Despawned slots are recycled with a bumped generation, so stale
///   `EntityId`s never alias a new marker.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    draw_order: Vec<EntityId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, marker: Marker) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.marker = Some(marker);
                EntityId(Handle::new(index, slot.generation))
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    marker: Some(marker),
                });
                EntityId(Handle::new(index, 0))
            }
        };
        self.draw_order.push(id);
        id
    }

    pub fn despawn(&mut self, entity: EntityId) -> Option<Marker> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        let marker = slot.marker.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.draw_order.retain(|e| *e != entity);
        Some(marker)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.get(entity).is_some()
    }

    pub fn get(&self, entity: EntityId) -> Option<&Marker> {
        let slot = self.slots.get(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.marker.as_ref()
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Marker> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.marker.as_mut()
    }

    pub fn len(&self) -> usize {
        self.draw_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_order.is_empty()
    }

    /// Entities in paint order (bottom first).
    pub fn draw_order(&self) -> &[EntityId] {
        &self.draw_order
    }

    pub fn iter_draw_order(&self) -> impl Iterator<Item = (EntityId, &Marker)> + '_ {
        self.draw_order
            .iter()
            .filter_map(move |&e| self.get(e).map(|m| (e, m)))
    }

    /// Moves `entity` to the top of the paint order. Returns `false` if it
    /// is unknown or already on top.
    pub fn bring_to_front(&mut self, entity: EntityId) -> bool {
        let Some(pos) = self.draw_order.iter().position(|e| *e == entity) else {
            return false;
        };
        if pos + 1 == self.draw_order.len() {
            return false;
        }
        let e = self.draw_order.remove(pos);
        self.draw_order.push(e);
        true
    }

    pub fn find_by_marker_id(&self, id: &MarkerId) -> Option<EntityId> {
        self.iter_draw_order()
            .find(|(_, m)| m.id() == Some(id))
            .map(|(e, _)| e)
    }

    /// Re-resolves every marker's cached scale.
    pub fn update_scales(&mut self, zoom: Option<f64>, scaling_allowed: bool) {
        for slot in &mut self.slots {
            if let Some(m) = slot.marker.as_mut() {
                m.update_scale(zoom, scaling_allowed);
            }
        }
    }

    pub fn sync_completion(&mut self, store: &CompletionStore) {
        for slot in &mut self.slots {
            if let Some(m) = slot.marker.as_mut() {
                m.sync_completion(store);
            }
        }
    }

    /// Drains per-marker redraw requests; returns how many were pending.
    pub fn take_redraw_requests(&mut self) -> usize {
        let mut n = 0;
        for slot in &mut self.slots {
            if let Some(m) = slot.marker.as_mut() {
                if m.take_redraw_request() {
                    n += 1;
                }
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::marker::{Glyph, Marker, MarkerOptions};
    use foundation::ids::MarkerId;
    use foundation::math::LatLng;

    fn marker(id: &str) -> Marker {
        Marker::new(
            MarkerId::new(id),
            LatLng::new(0.0, 0.0),
            Glyph::circle("#fff"),
            MarkerOptions::default(),
        )
    }

    #[test]
    fn draw_order_follows_spawn_order() {
        let mut w = World::new();
        let a = w.spawn(marker("a"));
        let b = w.spawn(marker("b"));
        let c = w.spawn(marker("c"));
        assert_eq!(w.draw_order(), &[a, b, c]);
    }

    #[test]
    fn bring_to_front_moves_to_end() {
        let mut w = World::new();
        let a = w.spawn(marker("a"));
        let b = w.spawn(marker("b"));
        assert!(w.bring_to_front(a));
        assert_eq!(w.draw_order(), &[b, a]);
        assert!(!w.bring_to_front(a));
    }

    #[test]
    fn stale_ids_do_not_alias_recycled_slots() {
        let mut w = World::new();
        let a = w.spawn(marker("a"));
        assert!(w.despawn(a).is_some());
        let b = w.spawn(marker("b"));
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(w.get(a).is_none());
        assert!(w.despawn(a).is_none());
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn finds_markers_by_id() {
        let mut w = World::new();
        w.spawn(marker("a"));
        let b = w.spawn(marker("b"));
        assert_eq!(w.find_by_marker_id(&MarkerId::new("b").unwrap()), Some(b));
        assert_eq!(w.find_by_marker_id(&MarkerId::new("z").unwrap()), None);
    }

    #[test]
    fn redraw_requests_drain_once() {
        let mut w = World::new();
        w.spawn(marker("a"));
        w.spawn(marker("b"));
        assert_eq!(w.take_redraw_requests(), 2);
        assert_eq!(w.take_redraw_requests(), 0);
    }
}
