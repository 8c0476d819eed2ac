use std::collections::BTreeMap;

use runtime::{EventBus, TimerId, Timers};
use storage::{KeyValueStore, SharedStore, StorageError};
use tracing::{debug, warn};

use crate::collapse::CollapseState;
use crate::error::{ControlError, StateError};
use crate::host::LayerHost;
use crate::layer::{GroupCheckState, LayerHandle, LayerRecord};
use crate::options::ControlOptions;
use crate::registry::LayerRegistry;
use crate::state::{PersistedUiState, RestoreAction, restore};
use crate::view::{self, ControlView};

/// Notifications toward the map, mirroring layer changes the control saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    OverlayAdd {
        layer: LayerHandle,
        name: String,
        group: String,
    },
    OverlayRemove {
        layer: LayerHandle,
        name: String,
        group: String,
    },
    BaseLayerChange {
        layer: LayerHandle,
        name: String,
        group: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ControlTask {
    RestoreState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlayEntry {
    layer: LayerHandle,
    name: String,
    group: String,
}

/// Grouped layer control.
///
/// Translates input clicks into add/remove calls on a [`LayerHost`], keeps
/// group tri-states and collapse flags, and persists the resulting UI state
/// after every mutation.
///
/// Overlays may be registered per base layer ("overlay sets"): only the set
/// named after the active base layer is in the registry, and a base layer
/// change swaps sets.
pub struct LayerControl {
    options: ControlOptions,
    registry: LayerRegistry,
    collapse: CollapseState,
    group_states: Vec<(String, GroupCheckState)>,
    events: EventBus<ControlEvent>,
    store: Option<SharedStore>,
    timers: Timers<ControlTask>,
    restore_timer: Option<TimerId>,
    added: bool,
    handling_click: bool,
    restoring: bool,
    overlay_sets: BTreeMap<String, Vec<OverlayEntry>>,
    current_set: Option<String>,
    overlay_swaps: u64,
    last_write_error: Option<StorageError>,
}

impl std::fmt::Debug for LayerControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerControl")
            .field("layers", &self.registry.len())
            .field("added", &self.added)
            .field("restore_pending", &self.restore_timer.is_some())
            .field("current_set", &self.current_set)
            .finish()
    }
}

impl LayerControl {
    /// `store` backs state persistence; without one the control never
    /// persists or restores.
    pub fn new(options: ControlOptions, store: Option<SharedStore>) -> Self {
        Self {
            registry: LayerRegistry::new(&options),
            options,
            collapse: CollapseState::new(),
            group_states: Vec::new(),
            events: EventBus::new(),
            store,
            timers: Timers::new(),
            restore_timer: None,
            added: false,
            handling_click: false,
            restoring: false,
            overlay_sets: BTreeMap::new(),
            current_set: None,
            overlay_swaps: 0,
            last_write_error: None,
        }
    }

    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn collapse(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn is_added(&self) -> bool {
        self.added
    }

    pub fn restore_pending(&self) -> bool {
        self.restore_timer.is_some()
    }

    pub fn last_write_error(&self) -> Option<&StorageError> {
        self.last_write_error.as_ref()
    }

    /// `group` of `None` puts the layer in the global base radio group.
    pub fn add_base_layer(&mut self, layer: LayerHandle, name: &str, group: Option<&str>) {
        self.register(layer, name, group.unwrap_or(""), false);
    }

    pub fn add_overlay(&mut self, layer: LayerHandle, name: &str, group: &str) {
        self.register(layer, name, group, true);
    }

    pub fn remove_layer(&mut self, layer: LayerHandle) -> Option<LayerRecord> {
        self.registry.remove_layer(layer)
    }

    /// Registers an overlay under the set shown while base layer `set` is
    /// active.
    pub fn define_overlay(&mut self, set: &str, layer: LayerHandle, name: &str, group: &str) {
        self.overlay_sets
            .entry(set.to_string())
            .or_default()
            .push(OverlayEntry {
                layer,
                name: name.to_string(),
                group: group.to_string(),
            });
        if self.current_set.as_deref() == Some(set) {
            self.register(layer, name, group, true);
        }
    }

    pub fn current_overlay_set(&self) -> Option<&str> {
        self.current_set.as_deref()
    }

    pub fn overlay_set_layers(&self, set: &str) -> Vec<LayerHandle> {
        self.overlay_sets
            .get(set)
            .map(|entries| entries.iter().map(|e| e.layer).collect())
            .unwrap_or_default()
    }

    /// Replaces the registered overlays with the set named `set`.
    ///
    /// Overlays of the previous set are taken off the map and out of the
    /// registry; the new ones are registered unselected.
    pub fn show_overlay_set(&mut self, set: &str, host: &mut dyn LayerHost) {
        if self.current_set.as_deref() == Some(set) {
            return;
        }
        if let Some(previous) = self.current_set.take() {
            let entries = self.overlay_sets.get(&previous).cloned().unwrap_or_default();
            for entry in entries {
                if host.has_layer(entry.layer) {
                    host.remove_layer(entry.layer);
                    self.on_layer_change(entry.layer, false, host);
                }
                self.registry.remove_layer(entry.layer);
            }
        }
        let entries = self.overlay_sets.get(set).cloned().unwrap_or_default();
        for entry in &entries {
            self.register(entry.layer, &entry.name, &entry.group, true);
        }
        debug!(set, overlays = entries.len(), "overlay set shown");
        self.current_set = Some(set.to_string());
        self.overlay_swaps += 1;
        self.refresh_group_states(&*host);
    }

    /// Shows the overlay set named after the active base layer, if any.
    pub fn sync_overlay_set(&mut self, host: &mut dyn LayerHost) {
        if self.overlay_sets.is_empty() {
            return;
        }
        let active_base = self
            .registry
            .records()
            .iter()
            .find(|r| !r.overlay && host.has_layer(r.handle))
            .map(|r| r.name.clone());
        if let Some(name) = active_base {
            self.show_overlay_set(&name, host);
        }
    }

    /// Forgets every overlay set, taking their overlays off the map.
    pub fn clear_overlay_sets(&mut self, host: &mut dyn LayerHost) {
        let sets = std::mem::take(&mut self.overlay_sets);
        for entry in sets.values().flatten() {
            if host.has_layer(entry.layer) {
                host.remove_layer(entry.layer);
                self.on_layer_change(entry.layer, false, host);
            }
            self.registry.remove_layer(entry.layer);
        }
        self.current_set = None;
        self.refresh_group_states(&*host);
    }

    /// The control was put on the map.
    ///
    /// Shows the overlay set of the active base layer and schedules the
    /// deferred state restore.
    pub fn on_add(&mut self, host: &mut dyn LayerHost) {
        self.added = true;
        self.sync_overlay_set(host);
        self.refresh_group_states(&*host);
        if self.options.state_persistence && self.store.is_some() && self.restore_timer.is_none() {
            let id = self
                .timers
                .schedule(self.options.restore_delay_ms, ControlTask::RestoreState);
            self.restore_timer = Some(id);
        }
    }

    /// The control was taken off the map. A pending restore is abandoned.
    pub fn on_remove(&mut self) {
        self.added = false;
        if let Some(id) = self.restore_timer.take() {
            self.timers.cancel(id);
            debug!("pending layer state restore cancelled");
        }
    }

    /// Advances the control's clock, running due tasks.
    pub fn advance_by(&mut self, delta_ms: u64, host: &mut dyn LayerHost) {
        for task in self.timers.advance_by(delta_ms) {
            match task {
                ControlTask::RestoreState => {
                    self.restore_timer = None;
                    self.restore_state(host);
                }
            }
        }
    }

    /// A layer input was clicked.
    ///
    /// Radio inputs deselect their active sibling before the new layer is
    /// added, so at most one member of a radio group is ever on the map.
    /// Unchecking a radio directly is ignored.
    pub fn on_user_toggle(
        &mut self,
        layer: LayerHandle,
        checked: bool,
        host: &mut dyn LayerHost,
    ) -> Result<(), ControlError> {
        let Some(record) = self.registry.find(layer).cloned() else {
            warn!(%layer, "toggle for unknown layer");
            return Err(ControlError::UnknownLayer(layer));
        };
        self.handling_click = true;
        if record.is_radio() && !checked {
            debug!(%layer, name = record.name.as_str(), "ignoring uncheck of a radio input");
        } else if checked {
            self.select(&record, host);
        } else {
            self.deselect(&record, host);
        }
        self.handling_click = false;
        self.refresh_group_states(&*host);
        self.persist(&*host);
        Ok(())
    }

    /// A group checkbox was clicked: every member follows `checked`.
    pub fn on_group_toggle(
        &mut self,
        group: &str,
        checked: bool,
        host: &mut dyn LayerHost,
    ) -> Result<(), ControlError> {
        let members: Vec<LayerRecord> = self.registry.members(group).cloned().collect();
        let Some(first) = members.first() else {
            warn!(group, "toggle for unknown group");
            return Err(ControlError::UnknownGroup(group.to_string()));
        };
        if !view::has_group_checkbox(first, &self.options) {
            return Err(ControlError::GroupNotToggleable(group.to_string()));
        }
        self.handling_click = true;
        for record in &members {
            if checked {
                self.select(record, host);
            } else {
                self.deselect(record, host);
            }
        }
        self.handling_click = false;
        self.refresh_group_states(&*host);
        self.persist(&*host);
        Ok(())
    }

    /// Flips a group box open/closed; returns the new collapsed flag.
    pub fn toggle_collapsed(&mut self, group: &str, host: &dyn LayerHost) -> Result<bool, ControlError> {
        let boxed = self.registry.members(group).any(|r| r.in_group_box());
        if !boxed {
            return Err(ControlError::UnknownGroup(group.to_string()));
        }
        if !self.options.groups_collapsable {
            return Err(ControlError::GroupNotToggleable(group.to_string()));
        }
        let collapsed = self.collapse.toggle(group);
        self.persist(host);
        Ok(collapsed)
    }

    /// The map added or removed `layer`, whoever asked for it.
    ///
    /// Unknown layers are ignored. A newly added base layer swaps in its
    /// overlay set.
    pub fn on_layer_change(&mut self, layer: LayerHandle, added: bool, host: &mut dyn LayerHost) {
        let Some(record) = self.registry.find(layer).cloned() else {
            return;
        };
        if !self.handling_click {
            self.refresh_group_states(&*host);
        }
        let (name, group) = (record.name.clone(), record.group.name.clone());
        match (record.overlay, added) {
            (true, true) => self.events.emit(ControlEvent::OverlayAdd { layer, name, group }),
            (true, false) => self.events.emit(ControlEvent::OverlayRemove { layer, name, group }),
            (false, true) => {
                self.events.emit(ControlEvent::BaseLayerChange {
                    layer,
                    name: name.clone(),
                    group,
                });
                if !self.overlay_sets.is_empty() {
                    self.show_overlay_set(&name, host);
                }
            }
            (false, false) => {}
        }
        self.persist(&*host);
    }

    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        self.events.drain()
    }

    /// Cached tri-state of a checkbox group.
    pub fn group_state(&self, group: &str) -> Option<GroupCheckState> {
        self.group_states
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, state)| *state)
    }

    pub fn view(&self, host: &dyn LayerHost) -> ControlView {
        view::build(&self.registry, host, &self.collapse, &self.options)
    }

    pub fn snapshot(&self, host: &dyn LayerHost) -> PersistedUiState {
        let collapse = self.options.groups_collapsable.then_some(&self.collapse);
        PersistedUiState::snapshot(&self.registry, host, collapse)
    }

    fn register(&mut self, layer: LayerHandle, name: &str, group: &str, overlay: bool) {
        self.registry.add_layer(layer, name, group, overlay);
        if overlay || !group.is_empty() {
            self.collapse.observe(group, overlay);
        }
    }

    fn select(&mut self, record: &LayerRecord, host: &mut dyn LayerHost) {
        if host.has_layer(record.handle) {
            return;
        }
        for sibling in self.registry.radio_siblings(record) {
            if host.has_layer(sibling) {
                host.remove_layer(sibling);
                self.on_layer_change(sibling, false, host);
            }
        }
        if record.overlay {
            host.add_overlay(record.handle);
        } else {
            host.set_base_layer(record.handle);
        }
        self.on_layer_change(record.handle, true, host);
    }

    fn deselect(&mut self, record: &LayerRecord, host: &mut dyn LayerHost) {
        if host.has_layer(record.handle) {
            host.remove_layer(record.handle);
            self.on_layer_change(record.handle, false, host);
        }
    }

    fn refresh_group_states(&mut self, host: &dyn LayerHost) {
        self.group_states = view::group_check_states(&self.registry, host, &self.options);
    }

    fn persist(&mut self, host: &dyn LayerHost) {
        if !self.options.state_persistence || !self.added || self.restoring || self.handling_click {
            return;
        }
        let Some(store) = self.store.clone() else {
            return;
        };
        let raw = match self.snapshot(host).encode() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to encode layer state");
                return;
            }
        };
        match store.borrow_mut().set_item(&self.options.state_key, &raw) {
            Ok(()) => self.last_write_error = None,
            Err(e) => {
                warn!(key = self.options.state_key.as_str(), error = %e, "failed to save layer state");
                self.last_write_error = Some(e);
            }
        }
    }

    fn load_state(&self) -> Option<PersistedUiState> {
        let store = self.store.as_ref()?;
        let raw = match store.borrow().get_item(&self.options.state_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = self.options.state_key.as_str(), error = %e, "failed to read layer state");
                return None;
            }
        };
        match PersistedUiState::decode(&raw) {
            Ok(state) => Some(state),
            Err(StateError::Corrupt(msg)) | Err(StateError::Encode(msg)) => {
                warn!(key = self.options.state_key.as_str(), error = msg.as_str(), "ignoring corrupt layer state");
                None
            }
        }
    }

    /// Replays the persisted state as synthetic clicks.
    ///
    /// Snapshot writes are suppressed for the whole replay; one snapshot is
    /// written at the end. When a base layer selection swaps overlay sets,
    /// the remaining steps are planned again against the new registry.
    fn restore_state(&mut self, host: &mut dyn LayerHost) {
        let Some(state) = self.load_state() else {
            return;
        };
        self.restoring = true;
        let mut actions = self.plan_restore(&state, &*host).into_iter();
        let mut replayed = 0usize;
        while let Some(action) = actions.next() {
            let swaps = self.overlay_swaps;
            match action {
                RestoreAction::SelectLayer(layer) => {
                    if let Some(record) = self.registry.find(layer).cloned() {
                        self.select(&record, host);
                    }
                }
                RestoreAction::SetCollapsed { group, collapsed } => {
                    self.collapse.set(&group, collapsed);
                }
            }
            replayed += 1;
            if self.overlay_swaps != swaps {
                actions = self.plan_restore(&state, &*host).into_iter();
            }
        }
        self.restoring = false;
        self.refresh_group_states(&*host);
        self.persist(&*host);
        debug!(replayed, "layer state restored");
    }

    fn plan_restore(&self, state: &PersistedUiState, host: &dyn LayerHost) -> Vec<RestoreAction> {
        let collapse = self.options.groups_collapsable.then_some(&self.collapse);
        restore(state, &self.registry, host, collapse)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{ControlEvent, LayerControl};
    use crate::error::ControlError;
    use crate::host::{ActiveLayers, LayerHost};
    use crate::layer::{GroupCheckState, LayerHandle};
    use crate::options::ControlOptions;
    use crate::state::PersistedUiState;
    use foundation::handles::Handle;
    use pretty_assertions::assert_eq;
    use storage::{InMemoryStore, KeyValueStore, SharedStore, StorageError, shared};

    const KEY: &str = "leafletGroupedLayersState";

    /// Counts writes on top of an in-memory store.
    struct CountingStore {
        inner: InMemoryStore,
        writes: Rc<Cell<usize>>,
    }

    impl KeyValueStore for CountingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    fn h(i: u32) -> LayerHandle {
        LayerHandle(Handle::new(i, 0))
    }

    fn options() -> ControlOptions {
        ControlOptions {
            exclusive_groups: vec!["Regions".into()],
            group_checkboxes: true,
            groups_collapsable: true,
            ..ControlOptions::default()
        }
    }

    const SKY: u32 = 0;
    const SURFACE: u32 = 1;
    const SHRINES: u32 = 10;
    const CAVES: u32 = 11;
    const NORTH: u32 = 20;
    const SOUTH: u32 = 21;
    const EAST: u32 = 22;

    fn control(store: Option<SharedStore>) -> (LayerControl, ActiveLayers) {
        let mut c = LayerControl::new(options(), store);
        c.add_base_layer(h(SKY), "Sky", None);
        c.add_base_layer(h(SURFACE), "Surface", None);
        c.add_overlay(h(SHRINES), "Shrines", "Locations");
        c.add_overlay(h(CAVES), "Caves", "Locations");
        c.add_overlay(h(NORTH), "North", "Regions");
        c.add_overlay(h(SOUTH), "South", "Regions");
        c.add_overlay(h(EAST), "East", "Regions");
        let mut host = ActiveLayers::new();
        host.set_base_layer(h(SKY));
        c.on_add(&mut host);
        (c, host)
    }

    fn active_in(host: &ActiveLayers, layers: &[u32]) -> usize {
        layers.iter().filter(|&&i| host.has_layer(h(i))).count()
    }

    #[test]
    fn exclusive_group_never_has_two_members() {
        let (mut c, mut host) = control(None);
        let regions = [NORTH, SOUTH, EAST];
        let script = [
            (NORTH, true),
            (SOUTH, true),
            (SOUTH, false),
            (EAST, true),
            (NORTH, true),
            (NORTH, false),
            (EAST, true),
            (SOUTH, true),
        ];
        for (layer, checked) in script {
            c.on_user_toggle(h(layer), checked, &mut host).unwrap();
            assert!(active_in(&host, &regions) <= 1);
        }
        assert!(host.has_layer(h(SOUTH)));
    }

    #[test]
    fn unchecking_the_active_radio_is_ignored() {
        let (mut c, mut host) = control(None);
        c.on_user_toggle(h(NORTH), true, &mut host).unwrap();
        c.on_user_toggle(h(NORTH), false, &mut host).unwrap();
        assert!(host.has_layer(h(NORTH)));
        c.on_user_toggle(h(SKY), false, &mut host).unwrap();
        assert!(host.has_layer(h(SKY)));
    }

    #[test]
    fn base_switch_removes_previous_then_adds() {
        let (mut c, mut host) = control(None);
        c.drain_events();
        c.on_user_toggle(h(SURFACE), true, &mut host).unwrap();
        assert!(!host.has_layer(h(SKY)));
        assert!(host.has_layer(h(SURFACE)));
        assert_eq!(
            c.drain_events(),
            vec![ControlEvent::BaseLayerChange {
                layer: h(SURFACE),
                name: "Surface".into(),
                group: String::new(),
            }]
        );

        c.on_user_toggle(h(NORTH), true, &mut host).unwrap();
        c.drain_events();
        c.on_user_toggle(h(EAST), true, &mut host).unwrap();
        let events = c.drain_events();
        assert!(matches!(events[0], ControlEvent::OverlayRemove { layer, .. } if layer == h(NORTH)));
        assert!(matches!(events[1], ControlEvent::OverlayAdd { layer, .. } if layer == h(EAST)));
    }

    #[test]
    fn tri_state_follows_individual_and_group_toggles() {
        let (mut c, mut host) = control(None);
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Unchecked));
        c.on_user_toggle(h(SHRINES), true, &mut host).unwrap();
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Indeterminate));
        c.on_user_toggle(h(CAVES), true, &mut host).unwrap();
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Checked));
        c.on_group_toggle("Locations", false, &mut host).unwrap();
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Unchecked));
        assert_eq!(active_in(&host, &[SHRINES, CAVES]), 0);
        c.on_group_toggle("Locations", true, &mut host).unwrap();
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Checked));
        assert_eq!(active_in(&host, &[SHRINES, CAVES]), 2);

        // External removal refreshes too.
        host.remove_layer(h(CAVES));
        c.on_layer_change(h(CAVES), false, &mut host);
        assert_eq!(c.group_state("Locations"), Some(GroupCheckState::Indeterminate));
        // Exclusive groups carry no checkbox.
        assert_eq!(c.group_state("Regions"), None);
    }

    #[test]
    fn misuse_is_reported() {
        let (mut c, mut host) = control(None);
        assert_eq!(
            c.on_user_toggle(h(99), true, &mut host),
            Err(ControlError::UnknownLayer(h(99)))
        );
        assert_eq!(
            c.on_group_toggle("Nope", true, &mut host),
            Err(ControlError::UnknownGroup("Nope".into()))
        );
        assert_eq!(
            c.on_group_toggle("Regions", true, &mut host),
            Err(ControlError::GroupNotToggleable("Regions".into()))
        );
        // Unknown layers from the map are ignored.
        c.on_layer_change(h(99), true, &mut host);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let store = shared(InMemoryStore::new());
        let (mut c, mut host) = control(Some(store.clone()));
        c.on_user_toggle(h(SHRINES), true, &mut host).unwrap();
        let collapsed = c.toggle_collapsed("Locations", &host).unwrap();
        assert!(!collapsed);

        let raw = store.borrow().get_item(KEY).unwrap().unwrap();
        assert_eq!(
            PersistedUiState::decode(&raw).unwrap(),
            PersistedUiState {
                selected_layers: vec!["Shrines".into()],
                collapsed_groups: vec!["Regions".into()],
                base_layer: Some("Sky".into()),
            }
        );
    }

    #[test]
    fn deferred_restore_replays_and_writes_once() {
        let writes = Rc::new(Cell::new(0));
        let mut inner = InMemoryStore::new();
        inner
            .set_item(
                KEY,
                r#"{"selectedLayers":["Caves","South","Gone"],"collapsedGroups":[],"baseLayer":"Surface"}"#,
            )
            .unwrap();
        let store = shared(CountingStore {
            inner,
            writes: writes.clone(),
        });
        let (mut c, mut host) = control(Some(store));
        assert!(c.restore_pending());

        c.advance_by(99, &mut host);
        assert!(!host.has_layer(h(CAVES)));
        c.advance_by(1, &mut host);
        assert!(!c.restore_pending());

        assert!(host.has_layer(h(SURFACE)));
        assert!(!host.has_layer(h(SKY)));
        assert!(host.has_layer(h(CAVES)));
        assert!(host.has_layer(h(SOUTH)));
        assert!(!c.collapse().is_collapsed("Locations"));
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn removing_the_control_cancels_restore() {
        let mut inner = InMemoryStore::new();
        inner
            .set_item(KEY, r#"{"selectedLayers":["Caves"]}"#)
            .unwrap();
        let (mut c, mut host) = control(Some(shared(inner)));
        c.on_remove();
        c.advance_by(1_000, &mut host);
        assert!(!host.has_layer(h(CAVES)));
    }

    #[test]
    fn corrupt_state_is_skipped() {
        let mut inner = InMemoryStore::new();
        inner.set_item(KEY, "{selectedLayers").unwrap();
        let (mut c, mut host) = control(Some(shared(inner)));
        c.advance_by(100, &mut host);
        assert_eq!(host.len(), 1);
        assert!(c.collapse().is_collapsed("Locations"));
    }

    fn per_map_control(store: Option<SharedStore>) -> (LayerControl, ActiveLayers) {
        let mut c = LayerControl::new(options(), store);
        c.add_base_layer(h(SKY), "Sky", None);
        c.add_base_layer(h(SURFACE), "Surface", None);
        c.define_overlay("Sky", h(SHRINES), "Shrines", "Locations");
        c.define_overlay("Surface", h(CAVES), "Caves", "Locations");
        let mut host = ActiveLayers::new();
        host.set_base_layer(h(SKY));
        c.on_add(&mut host);
        (c, host)
    }

    #[test]
    fn base_change_swaps_overlay_sets() {
        let (mut c, mut host) = per_map_control(None);
        assert_eq!(c.current_overlay_set(), Some("Sky"));
        assert!(c.registry().find(h(SHRINES)).is_some());
        assert!(c.registry().find(h(CAVES)).is_none());

        c.on_user_toggle(h(SHRINES), true, &mut host).unwrap();
        c.on_user_toggle(h(SURFACE), true, &mut host).unwrap();
        assert_eq!(c.current_overlay_set(), Some("Surface"));
        assert!(!host.has_layer(h(SHRINES)));
        assert!(c.registry().find(h(SHRINES)).is_none());
        assert!(c.registry().find(h(CAVES)).is_some());
        assert!(!host.has_layer(h(CAVES)));
    }

    #[test]
    fn clearing_sets_drops_their_overlays() {
        let (mut c, mut host) = per_map_control(None);
        c.on_user_toggle(h(SHRINES), true, &mut host).unwrap();
        c.clear_overlay_sets(&mut host);
        assert!(!host.has_layer(h(SHRINES)));
        assert!(c.registry().find(h(SHRINES)).is_none());
        assert_eq!(c.current_overlay_set(), None);

        c.define_overlay("Sky", h(CAVES), "Caves", "Locations");
        c.sync_overlay_set(&mut host);
        assert!(c.registry().find(h(CAVES)).is_some());
    }

    #[test]
    fn restore_resolves_overlays_after_the_base_swap() {
        let mut inner = InMemoryStore::new();
        inner
            .set_item(KEY, r#"{"selectedLayers":["Caves"],"baseLayer":"Surface"}"#)
            .unwrap();
        let (mut c, mut host) = per_map_control(Some(shared(inner)));
        c.advance_by(100, &mut host);
        assert!(host.has_layer(h(SURFACE)));
        assert!(host.has_layer(h(CAVES)));
        assert_eq!(c.current_overlay_set(), Some("Surface"));
    }

    #[test]
    fn view_reflects_selection() {
        let (mut c, mut host) = control(None);
        c.on_user_toggle(h(SHRINES), true, &mut host).unwrap();
        let v = c.view(&host);
        assert!(v.separator_visible);
        assert_eq!(v.base.len(), 2);
        assert_eq!(v.overlays.len(), 2);
    }
}
