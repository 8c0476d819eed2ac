use std::collections::BTreeMap;

use foundation::handles::{Handle, HandleAllocator};
use foundation::math::Vec2;
use layers::{ActiveLayers, ControlEvent, LayerControl, LayerHandle, LayerHost};
use render::{Canvas, FrameStats, MarkerRenderer};
use runtime::RedrawQueue;
use scene::picking::pick_screen;
use scene::{EntityId, Glyph, Marker, MarkerOptions, Viewport, World};
use storage::{CompletionStore, DisplaySettings, SharedStore};
use tracing::{debug, warn};

use crate::dataset::{FeatureRecord, LoadReport};
use crate::error::SessionError;
use crate::options::SessionOptions;
use crate::pointer::{Command, PointerKind};

/// Popup content with its live completion status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub title: String,
    pub description: String,
    pub position: String,
    pub status: &'static str,
}

/// Everything one interactive map owns.
///
/// Single-threaded: every method runs to completion on the caller's event
/// loop. Mutations only request a redraw; [`MapSession::render_frame`] draws
/// at most once per call however many requests piled up.
pub struct MapSession<H: LayerHost = ActiveLayers> {
    options: SessionOptions,
    store: SharedStore,
    world: World,
    completions: CompletionStore,
    settings: DisplaySettings,
    control: LayerControl,
    host: H,
    handles: HandleAllocator,
    base_layers: Vec<(LayerHandle, String)>,
    /// map layer -> group -> subgroup -> overlay.
    overlays: BTreeMap<String, BTreeMap<String, BTreeMap<String, LayerHandle>>>,
    marker_layers: BTreeMap<EntityId, LayerHandle>,
    redraw: RedrawQueue,
    renderer: MarkerRenderer,
    open_popup: Option<EntityId>,
    /// Zoom of the last zoom-end; markers spawned later start at its scale.
    zoom: Option<f64>,
}

impl MapSession<ActiveLayers> {
    pub fn in_memory_host(options: SessionOptions, store: SharedStore) -> Self {
        Self::new(options, store, ActiveLayers::new())
    }
}

impl<H: LayerHost> MapSession<H> {
    pub fn new(options: SessionOptions, store: SharedStore, host: H) -> Self {
        let completions = CompletionStore::open(store.clone());
        let settings = DisplaySettings::load(&store);
        let control_store = options.control.state_persistence.then(|| store.clone());
        let control = LayerControl::new(options.control.clone(), control_store);
        let renderer = MarkerRenderer::new().with_cull_padding(options.cull_padding_px);
        let mut redraw = RedrawQueue::new();
        redraw.request();
        Self {
            options,
            store,
            world: World::new(),
            completions,
            settings,
            control,
            host,
            handles: HandleAllocator::new(),
            base_layers: Vec::new(),
            overlays: BTreeMap::new(),
            marker_layers: BTreeMap::new(),
            redraw,
            renderer,
            open_popup: None,
            zoom: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn completions(&self) -> &CompletionStore {
        &self.completions
    }

    pub fn settings(&self) -> DisplaySettings {
        self.settings
    }

    pub fn control(&self) -> &LayerControl {
        &self.control
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn allocate_layer(&mut self) -> LayerHandle {
        let handle: Handle = self.handles.allocate();
        LayerHandle(handle)
    }

    /// Registers a base layer. The first one goes on the map right away.
    pub fn add_base_layer(&mut self, name: &str, group: Option<&str>) -> LayerHandle {
        let layer = self.allocate_layer();
        self.control.add_base_layer(layer, name, group);
        if self.base_layers.is_empty() {
            self.host.set_base_layer(layer);
        }
        self.base_layers.push((layer, name.to_string()));
        layer
    }

    pub fn base_layer(&self, name: &str) -> Option<LayerHandle> {
        self.base_layers
            .iter()
            .find(|(_, n)| n == name)
            .map(|(l, _)| *l)
    }

    pub fn active_base_layer(&self) -> Option<&str> {
        self.base_layers
            .iter()
            .find(|(l, _)| self.host.has_layer(*l))
            .map(|(_, n)| n.as_str())
    }

    /// Overlay holding `(map_layer, group, subgroup)` markers.
    pub fn overlay(&self, map_layer: &str, group: &str, subgroup: &str) -> Option<LayerHandle> {
        self.overlays.get(map_layer)?.get(group)?.get(subgroup).copied()
    }

    /// Spawns one marker per record, grouped into per-map-layer overlays.
    pub fn load_features<I>(&mut self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = FeatureRecord>,
    {
        let mut report = LoadReport::default();
        for record in records {
            let overlay = self.overlay_for(&record);
            let id = record.marker_id(self.options.derive_missing_ids);
            match &id {
                None => {
                    debug!(position = %record.position, "feature without id");
                    report.without_id += 1;
                }
                Some(id) if self.world.find_by_marker_id(id).is_some() => {
                    debug!(id = id.as_str(), "duplicate feature id");
                    report.duplicate_ids += 1;
                }
                Some(_) => {}
            }
            let options = MarkerOptions {
                icon_anchor: None,
                zoom_scaling: self.options.marker_scaling,
            };
            let mut marker = Marker::new(id, record.position, record.glyph(), options);
            if let Some(popup) = record.popup() {
                marker = marker.with_popup(popup);
            }
            marker.sync_completion(&self.completions);
            marker.update_scale(self.zoom, self.settings.zoom_scaling_enabled);
            let entity = self.world.spawn(marker);
            self.marker_layers.insert(entity, overlay);
            report.spawned += 1;
        }
        if self.control.is_added() {
            self.control.sync_overlay_set(&mut self.host);
        }
        self.process_control_events();
        self.redraw.request();
        report
    }

    /// Drops every marker and overlay, then loads `records`.
    pub fn reload_features<I>(&mut self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = FeatureRecord>,
    {
        for entity in self.world.draw_order().to_vec() {
            self.world.despawn(entity);
        }
        self.marker_layers.clear();
        self.overlays.clear();
        self.open_popup = None;
        self.control.clear_overlay_sets(&mut self.host);
        self.load_features(records)
    }

    fn overlay_for(&mut self, record: &FeatureRecord) -> LayerHandle {
        if let Some(layer) = self.overlay(&record.map_layer, &record.group, &record.subgroup) {
            return layer;
        }
        let layer = self.allocate_layer();
        self.overlays
            .entry(record.map_layer.clone())
            .or_default()
            .entry(record.group.clone())
            .or_default()
            .insert(record.subgroup.clone(), layer);
        self.control
            .define_overlay(&record.map_layer, layer, &record.subgroup, &record.group);
        layer
    }

    /// Puts the layer control on the map; schedules the state restore.
    pub fn add_control(&mut self) {
        self.control.on_add(&mut self.host);
        self.process_control_events();
    }

    pub fn remove_control(&mut self) {
        self.control.on_remove();
    }

    /// Advances session time, running due deferred work.
    pub fn advance(&mut self, delta_ms: u64) {
        self.control.advance_by(delta_ms, &mut self.host);
        self.process_control_events();
    }

    pub fn toggle_layer(&mut self, layer: LayerHandle, checked: bool) -> Result<(), SessionError> {
        self.control.on_user_toggle(layer, checked, &mut self.host)?;
        self.process_control_events();
        Ok(())
    }

    pub fn toggle_group(&mut self, group: &str, checked: bool) -> Result<(), SessionError> {
        self.control.on_group_toggle(group, checked, &mut self.host)?;
        self.process_control_events();
        Ok(())
    }

    pub fn toggle_group_collapsed(&mut self, group: &str) -> Result<bool, SessionError> {
        Ok(self.control.toggle_collapsed(group, &self.host)?)
    }

    /// Switches the base layer by name, as a click on its radio would.
    pub fn select_base_layer(&mut self, name: &str) -> Result<(), SessionError> {
        let layer = self
            .base_layer(name)
            .ok_or_else(|| SessionError::UnknownBaseLayer(name.to_string()))?;
        self.toggle_layer(layer, true)
    }

    fn process_control_events(&mut self) {
        for event in self.control.drain_events() {
            match event {
                ControlEvent::BaseLayerChange { name, .. } => {
                    debug!(base = name.as_str(), "base layer changed");
                    self.open_popup = None;
                }
                ControlEvent::OverlayAdd { name, group, .. } => {
                    debug!(overlay = name.as_str(), group = group.as_str(), "overlay added");
                }
                ControlEvent::OverlayRemove { layer, name, .. } => {
                    debug!(overlay = name.as_str(), "overlay removed");
                    let hidden = self
                        .open_popup
                        .is_some_and(|e| self.marker_layers.get(&e) == Some(&layer));
                    if hidden {
                        self.open_popup = None;
                    }
                }
            }
            self.redraw.request();
        }
    }

    /// Whether `entity` is on the map: its overlay is active.
    pub fn is_marker_shown(&self, entity: EntityId) -> bool {
        self.marker_layers
            .get(&entity)
            .is_some_and(|layer| self.host.has_layer(*layer))
    }

    /// Routes a pointer event at container pixel `pixel` to the topmost
    /// shown marker under it.
    ///
    /// Hit-testing uses the projections of the last drawn frame, so the
    /// clickable area is what is on screen.
    pub fn handle_pointer_event(&self, kind: PointerKind, pixel: Vec2) -> Option<Command> {
        let host = &self.host;
        let layers = &self.marker_layers;
        let entity = pick_screen(&self.world, pixel, |e, _| {
            layers.get(&e).is_some_and(|l| host.has_layer(*l))
        })?;
        Some(match kind {
            PointerKind::Click => {
                let open_popup = self.world.get(entity).is_some_and(|m| m.popup().is_some());
                Command::BringToFront { entity, open_popup }
            }
            PointerKind::ContextMenu => Command::ToggleCompletion(entity),
        })
    }

    pub fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::BringToFront { entity, open_popup } => {
                if !self.world.contains(entity) {
                    return Err(SessionError::UnknownMarker(entity));
                }
                if self.world.bring_to_front(entity) {
                    self.redraw.request();
                }
                if open_popup {
                    self.open_popup = Some(entity);
                }
                Ok(())
            }
            Command::ToggleCompletion(entity) => self.toggle_completion(entity).map(|_| ()),
        }
    }

    /// Flips `entity`'s completion; returns the new state. Every marker with
    /// the same id shows the new state.
    ///
    /// Markers without a popup (labels) have nowhere to show the status and
    /// are left untouched.
    pub fn toggle_completion(&mut self, entity: EntityId) -> Result<bool, SessionError> {
        let marker = self
            .world
            .get_mut(entity)
            .ok_or(SessionError::UnknownMarker(entity))?;
        if marker.popup().is_none() {
            warn!(%entity, "no popup to show completion status; toggle aborted");
            return Err(SessionError::MissingPopup(entity));
        }
        let completed = marker.toggle_completion(&mut self.completions)?;
        // Markers sharing the id follow the store.
        self.world.sync_completion(&self.completions);
        self.redraw.request();
        Ok(completed)
    }

    pub fn open_popup(&self) -> Option<EntityId> {
        self.open_popup
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    pub fn popup(&self, entity: EntityId) -> Option<PopupView> {
        let marker = self.world.get(entity)?;
        let popup = marker.popup()?;
        Some(PopupView {
            title: popup.title.clone(),
            description: popup.description.clone(),
            position: popup.position.clone(),
            status: marker.status_text(),
        })
    }

    /// Icon load callback for a single marker.
    pub fn on_icon_loaded(&mut self, entity: EntityId, width: f64, height: f64) -> Result<bool, SessionError> {
        let marker = self
            .world
            .get_mut(entity)
            .ok_or(SessionError::UnknownMarker(entity))?;
        let loaded = marker.on_icon_loaded(width, height);
        if loaded {
            self.redraw.request();
        }
        Ok(loaded)
    }

    /// Delivers an image load to every marker drawn with `url`; returns how
    /// many became ready.
    pub fn on_image_loaded(&mut self, url: &str, width: f64, height: f64) -> usize {
        let targets: Vec<EntityId> = self
            .world
            .iter_draw_order()
            .filter(|(_, m)| !m.is_ready() && matches!(m.glyph(), Glyph::Icon { url: u } if u == url))
            .map(|(e, _)| e)
            .collect();
        let mut loaded = 0;
        for entity in targets {
            if let Some(marker) = self.world.get_mut(entity) {
                if marker.on_icon_loaded(width, height) {
                    loaded += 1;
                }
            }
        }
        if loaded > 0 {
            self.redraw.request();
        }
        loaded
    }

    /// Zoom-end: re-resolve every marker's scale.
    pub fn on_zoom_end(&mut self, viewport: &dyn Viewport) {
        self.zoom = viewport.current_zoom();
        self.world
            .update_scales(self.zoom, self.settings.zoom_scaling_enabled);
        self.redraw.request();
    }

    /// Pan-end or resize: positions must be re-projected.
    pub fn on_view_change(&mut self) {
        self.redraw.request();
    }

    /// Persists the global scaling switch and rescales every marker.
    pub fn set_zoom_scaling_enabled(&mut self, enabled: bool, viewport: &dyn Viewport) {
        self.settings.zoom_scaling_enabled = enabled;
        self.settings.save(&self.store);
        self.on_zoom_end(viewport);
    }

    /// Whether the next [`MapSession::render_frame`] will draw. Callers
    /// clear the canvas only when it does.
    pub fn frame_pending(&mut self) -> bool {
        if self.world.take_redraw_requests() > 0 {
            self.redraw.request();
        }
        self.redraw.is_pending()
    }

    /// Draws one frame if any redraw was requested since the last one.
    pub fn render_frame(&mut self, ctx: &mut dyn Canvas, viewport: &dyn Viewport) -> Option<FrameStats> {
        self.frame_pending();
        let frame = self.redraw.take_frame()?;
        let host = &self.host;
        let layers = &self.marker_layers;
        let stats = self
            .renderer
            .draw_world(ctx, &mut self.world, viewport, frame, |e, _| {
                layers.get(&e).is_some_and(|l| host.has_layer(*l))
            });
        Some(stats)
    }
}
