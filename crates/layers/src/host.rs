use std::collections::BTreeSet;

use crate::layer::LayerHandle;

/// The map side of the control: which layers are on the map.
pub trait LayerHost {
    fn has_layer(&self, layer: LayerHandle) -> bool;
    fn add_overlay(&mut self, layer: LayerHandle);
    /// Puts a base layer on the map. The control removes the base layer it
    /// replaces beforehand.
    fn set_base_layer(&mut self, layer: LayerHandle);
    fn remove_layer(&mut self, layer: LayerHandle);
}

/// In-memory host tracking the active layer set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActiveLayers {
    active: BTreeSet<LayerHandle>,
}

impl ActiveLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl LayerHost for ActiveLayers {
    fn has_layer(&self, layer: LayerHandle) -> bool {
        self.active.contains(&layer)
    }

    fn add_overlay(&mut self, layer: LayerHandle) {
        self.active.insert(layer);
    }

    fn set_base_layer(&mut self, layer: LayerHandle) {
        self.active.insert(layer);
    }

    fn remove_layer(&mut self, layer: LayerHandle) {
        self.active.remove(&layer);
    }
}
