//! Persisted selection and collapse state.
//!
//! The blob is keyed by human-readable layer and group names, so restoring
//! it is advisory: names that no longer resolve are skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collapse::CollapseState;
use crate::error::StateError;
use crate::host::LayerHost;
use crate::layer::LayerHandle;
use crate::registry::LayerRegistry;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedUiState {
    /// Active overlay names, in registry order.
    pub selected_layers: Vec<String>,
    pub collapsed_groups: Vec<String>,
    pub base_layer: Option<String>,
}

impl PersistedUiState {
    /// Captures the current selection. `collapse` is `None` when groups are
    /// not collapsible.
    pub fn snapshot(
        registry: &LayerRegistry,
        host: &dyn LayerHost,
        collapse: Option<&CollapseState>,
    ) -> Self {
        let mut state = Self::default();
        for record in registry.records() {
            if !host.has_layer(record.handle) {
                continue;
            }
            if record.overlay {
                if !state.selected_layers.contains(&record.name) {
                    state.selected_layers.push(record.name.clone());
                }
            } else if state.base_layer.is_none() {
                state.base_layer = Some(record.name.clone());
            }
        }
        if let Some(collapse) = collapse {
            for group in registry.groups_of() {
                let boxed = group.records.iter().any(|r| r.in_group_box());
                if boxed && collapse.is_collapsed(&group.info.name) {
                    state.collapsed_groups.push(group.info.name.clone());
                }
            }
        }
        state
    }

    pub fn encode(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(|e| StateError::Encode(e.to_string()))
    }

    pub fn decode(raw: &str) -> Result<Self, StateError> {
        serde_json::from_str(raw).map_err(|e| StateError::Corrupt(e.to_string()))
    }
}

/// One synthetic step of a state replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// Select the layer as if its input had been clicked.
    SelectLayer(LayerHandle),
    SetCollapsed { group: String, collapsed: bool },
}

/// Plans the replay of `state` against the current registry.
///
/// Ordering contract: the base layer first, then collapse flags in group
/// order, then overlays in `state` order. Only differences are emitted:
/// layers already on the map and groups already in the wanted state produce
/// no action, so planning again after a partial replay is safe.
pub fn restore(
    state: &PersistedUiState,
    registry: &LayerRegistry,
    host: &dyn LayerHost,
    collapse: Option<&CollapseState>,
) -> Vec<RestoreAction> {
    let mut actions = Vec::new();

    if let Some(name) = &state.base_layer {
        match registry.find_by_name(name, false) {
            Some(record) if !host.has_layer(record.handle) => {
                actions.push(RestoreAction::SelectLayer(record.handle));
            }
            Some(_) => {}
            None => debug!(name = name.as_str(), "restore: base layer not found"),
        }
    }

    if let Some(collapse) = collapse {
        for group in registry.groups_of() {
            if !group.records.iter().any(|r| r.in_group_box()) {
                continue;
            }
            let name = &group.info.name;
            let wanted = state.collapsed_groups.contains(name);
            if collapse.is_collapsed(name) != wanted {
                actions.push(RestoreAction::SetCollapsed {
                    group: name.clone(),
                    collapsed: wanted,
                });
            }
        }
    }

    for name in &state.selected_layers {
        match registry.find_by_name(name, true) {
            Some(record) if !host.has_layer(record.handle) => {
                if !actions.contains(&RestoreAction::SelectLayer(record.handle)) {
                    actions.push(RestoreAction::SelectLayer(record.handle));
                }
            }
            Some(_) => {}
            None => debug!(name = name.as_str(), "restore: overlay not found"),
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::{PersistedUiState, RestoreAction, restore};
    use crate::collapse::CollapseState;
    use crate::error::StateError;
    use crate::host::{ActiveLayers, LayerHost};
    use crate::layer::LayerHandle;
    use crate::options::ControlOptions;
    use crate::registry::LayerRegistry;
    use foundation::handles::Handle;
    use pretty_assertions::assert_eq;

    fn h(i: u32) -> LayerHandle {
        LayerHandle(Handle::new(i, 0))
    }

    fn registry() -> LayerRegistry {
        let mut r = LayerRegistry::new(&ControlOptions::default());
        r.add_layer(h(0), "Sky", "", false);
        r.add_layer(h(1), "Surface", "", false);
        r.add_layer(h(2), "Shrines", "Locations", true);
        r.add_layer(h(3), "Caves", "Locations", true);
        r.add_layer(h(4), "Koroks", "Collectibles", true);
        r
    }

    fn observed(r: &LayerRegistry) -> CollapseState {
        let mut c = CollapseState::new();
        for rec in r.records().iter().filter(|r| r.in_group_box()) {
            c.observe(&rec.group.name, rec.overlay);
        }
        c
    }

    fn apply(actions: Vec<RestoreAction>, host: &mut ActiveLayers, c: &mut CollapseState) {
        for action in actions {
            match action {
                RestoreAction::SelectLayer(l) => host.add_overlay(l),
                RestoreAction::SetCollapsed { group, collapsed } => {
                    c.set(&group, collapsed);
                }
            }
        }
    }

    #[test]
    fn snapshot_lists_active_names() {
        let r = registry();
        let mut host = ActiveLayers::new();
        host.set_base_layer(h(1));
        host.add_overlay(h(2));
        host.add_overlay(h(4));
        let mut c = observed(&r);
        c.set("Collectibles", false);

        let s = PersistedUiState::snapshot(&r, &host, Some(&c));
        assert_eq!(
            s,
            PersistedUiState {
                selected_layers: vec!["Koroks".into(), "Shrines".into()],
                collapsed_groups: vec!["Locations".into()],
                base_layer: Some("Surface".into()),
            }
        );
        assert_eq!(
            s.encode().unwrap(),
            r#"{"selectedLayers":["Koroks","Shrines"],"collapsedGroups":["Locations"],"baseLayer":"Surface"}"#
        );
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let r = registry();
        let mut host = ActiveLayers::new();
        host.set_base_layer(h(0));
        host.add_overlay(h(3));
        host.add_overlay(h(2));
        let mut c = observed(&r);
        c.set("Locations", false);
        let before = PersistedUiState::snapshot(&r, &host, Some(&c));

        let decoded = PersistedUiState::decode(&before.encode().unwrap()).unwrap();
        let mut fresh_host = ActiveLayers::new();
        let mut fresh_c = observed(&r);
        let actions = restore(&decoded, &r, &fresh_host, Some(&fresh_c));
        apply(actions, &mut fresh_host, &mut fresh_c);

        assert_eq!(PersistedUiState::snapshot(&r, &fresh_host, Some(&fresh_c)), before);
        // Nothing left to do on a second pass.
        assert!(restore(&decoded, &r, &fresh_host, Some(&fresh_c)).is_empty());
    }

    #[test]
    fn missing_names_are_skipped() {
        let r = registry();
        let state = PersistedUiState {
            selected_layers: vec!["Gone".into(), "Caves".into()],
            collapsed_groups: vec!["Renamed".into()],
            base_layer: Some("Depths".into()),
        };
        let host = ActiveLayers::new();
        let actions = restore(&state, &r, &host, None);
        assert_eq!(actions, vec![RestoreAction::SelectLayer(h(3))]);
    }

    #[test]
    fn base_layer_action_comes_first() {
        let r = registry();
        let state = PersistedUiState {
            selected_layers: vec!["Koroks".into()],
            collapsed_groups: vec![],
            base_layer: Some("Surface".into()),
        };
        let actions = restore(&state, &r, &ActiveLayers::new(), None);
        assert_eq!(
            actions,
            vec![RestoreAction::SelectLayer(h(1)), RestoreAction::SelectLayer(h(4))]
        );
    }

    #[test]
    fn decode_tolerates_missing_fields_and_rejects_garbage() {
        let s = PersistedUiState::decode(r#"{"baseLayer":null}"#).unwrap();
        assert_eq!(s, PersistedUiState::default());
        assert!(matches!(
            PersistedUiState::decode("{not json"),
            Err(StateError::Corrupt(_))
        ));
    }
}
