use std::cell::RefCell;

use console_error_panic_hook::set_once;
use foundation::math::{LatLng, Vec2};
use gloo_net::http::Request;
use render::{Canvas, WebCanvas};
use scene::AffineViewport;
use session::{Command, FeatureRecord, MapSession, PointerKind, SessionOptions};
use storage::{InMemoryStore, LocalStorageStore, SharedStore, shared};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

struct ViewerState {
    session: MapSession,
    canvas: WebCanvas,
    viewport: AffineViewport,
}

thread_local! {
    static STATE: RefCell<Option<ViewerState>> = const { RefCell::new(None) };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn with_state<R>(f: impl FnOnce(&mut ViewerState) -> R) -> Result<R, JsValue> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let viewer = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("map not initialized"))?;
        Ok(f(viewer))
    })
}

fn open_store() -> SharedStore {
    match LocalStorageStore::new() {
        Ok(store) => shared(store),
        Err(e) => {
            log(&format!("localStorage unavailable ({e}); progress will not survive a reload"));
            shared(InMemoryStore::new())
        }
    }
}

fn redraw(viewer: &mut ViewerState) {
    if !viewer.session.frame_pending() {
        return;
    }
    viewer.canvas.clear(viewer.viewport.pixel_bounds());
    viewer.session.render_frame(&mut viewer.canvas, &viewer.viewport);
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Binds the session to the canvas element `canvas_id`.
///
/// `options_json` is a `SessionOptions` document; empty means defaults.
#[wasm_bindgen]
pub fn init_map(canvas_id: &str, options_json: &str, base_layers: Vec<String>) -> Result<(), JsValue> {
    let options: SessionOptions = if options_json.trim().is_empty() {
        SessionOptions::default()
    } else {
        serde_json::from_str(options_json).map_err(js_err)?
    };
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let element: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas not found"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = element
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;

    let mut session = MapSession::in_memory_host(options, open_store());
    for name in &base_layers {
        session.add_base_layer(name, None);
    }
    let viewport = AffineViewport::new(
        LatLng::new(0.0, 0.0),
        0.0,
        Vec2::new(f64::from(element.width()), f64::from(element.height())),
    );
    STATE.with(|state| {
        *state.borrow_mut() = Some(ViewerState {
            session,
            canvas: WebCanvas::new(ctx),
            viewport,
        });
    });
    Ok(())
}

/// Fetches the feature list at `url`, replaces the markers and puts the
/// layer control on the map.
#[wasm_bindgen]
pub fn load_features(url: String) {
    spawn_local(async move {
        let records = match fetch_features(&url).await {
            Ok(r) => r,
            Err(err) => {
                log(&format!("Failed to fetch features: {:?}", err));
                return;
            }
        };
        let loaded = with_state(|viewer| {
            let report = viewer.session.reload_features(records);
            if !viewer.session.control().is_added() {
                viewer.session.add_control();
            }
            redraw(viewer);
            report
        });
        match loaded {
            Ok(report) => log(&format!(
                "loaded {} markers ({} without id, {} duplicate ids)",
                report.spawned, report.without_id, report.duplicate_ids
            )),
            Err(err) => log(&format!("{:?}", err)),
        }
    });
}

/// Moves the view. Call on pan end and zoom end.
#[wasm_bindgen]
pub fn set_view(origin_lat: f64, origin_lng: f64, zoom: f64) -> Result<(), JsValue> {
    with_state(|viewer| {
        let zoom_changed = viewer.viewport.zoom != Some(zoom);
        viewer.viewport.origin = LatLng::new(origin_lat, origin_lng);
        viewer.viewport.zoom = Some(zoom);
        if zoom_changed {
            viewer.session.on_zoom_end(&viewer.viewport);
        } else {
            viewer.session.on_view_change();
        }
        redraw(viewer);
    })
}

#[wasm_bindgen]
pub fn set_canvas_size(width: f64, height: f64) -> Result<(), JsValue> {
    with_state(|viewer| {
        viewer.viewport.size = Vec2::new(width, height);
        viewer.session.on_view_change();
        redraw(viewer);
    })
}

/// An icon image finished loading.
#[wasm_bindgen]
pub fn image_loaded(url: &str, image: HtmlImageElement) -> Result<u32, JsValue> {
    with_state(|viewer| {
        let (w, h) = (f64::from(image.natural_width()), f64::from(image.natural_height()));
        viewer.canvas.register_image(url, image);
        let ready = viewer.session.on_image_loaded(url, w, h);
        redraw(viewer);
        ready as u32
    })
}

/// Routes a pointer event. Returns the popup to show as JSON, or an empty
/// string.
#[wasm_bindgen]
pub fn pointer_event(context_menu: bool, x: f64, y: f64) -> Result<String, JsValue> {
    let kind = if context_menu {
        PointerKind::ContextMenu
    } else {
        PointerKind::Click
    };
    with_state(|viewer| {
        let Some(command) = viewer.session.handle_pointer_event(kind, Vec2::new(x, y)) else {
            return Ok(String::new());
        };
        viewer.session.apply(command).map_err(js_err)?;
        redraw(viewer);
        let entity = match command {
            Command::BringToFront { entity, .. } | Command::ToggleCompletion(entity) => entity,
        };
        let popup = viewer.session.popup(entity).filter(|_| viewer.session.open_popup() == Some(entity));
        Ok(popup
            .map(|p| {
                serde_json::json!({
                    "title": p.title,
                    "description": p.description,
                    "position": p.position,
                    "status": p.status,
                })
                .to_string()
            })
            .unwrap_or_default())
    })?
}

#[wasm_bindgen]
pub fn close_popup() -> Result<(), JsValue> {
    with_state(|viewer| viewer.session.close_popup())
}

#[wasm_bindgen]
pub fn select_base_layer(name: &str) -> Result<(), JsValue> {
    with_state(|viewer| {
        viewer.session.select_base_layer(name).map_err(js_err)?;
        redraw(viewer);
        Ok(())
    })?
}

#[wasm_bindgen]
pub fn toggle_overlay(map: &str, group: &str, subgroup: &str, checked: bool) -> Result<(), JsValue> {
    with_state(|viewer| {
        let layer = viewer
            .session
            .overlay(map, group, subgroup)
            .ok_or_else(|| JsValue::from_str("unknown overlay"))?;
        viewer.session.toggle_layer(layer, checked).map_err(js_err)?;
        redraw(viewer);
        Ok(())
    })?
}

#[wasm_bindgen]
pub fn toggle_group(group: &str, checked: bool) -> Result<(), JsValue> {
    with_state(|viewer| {
        viewer.session.toggle_group(group, checked).map_err(js_err)?;
        redraw(viewer);
        Ok(())
    })?
}

#[wasm_bindgen]
pub fn toggle_group_collapsed(group: &str) -> Result<bool, JsValue> {
    with_state(|viewer| viewer.session.toggle_group_collapsed(group).map_err(js_err))?
}

#[wasm_bindgen]
pub fn set_zoom_scaling(enabled: bool) -> Result<(), JsValue> {
    with_state(|viewer| {
        viewer.session.set_zoom_scaling_enabled(enabled, &viewer.viewport);
        redraw(viewer);
    })
}

/// Advances session time. Drive from `requestAnimationFrame` with the
/// elapsed milliseconds.
#[wasm_bindgen]
pub fn tick(delta_ms: f64) -> Result<(), JsValue> {
    with_state(|viewer| {
        viewer.session.advance(delta_ms.max(0.0) as u64);
        redraw(viewer);
    })
}

async fn fetch_features(url: &str) -> Result<Vec<FeatureRecord>, JsValue> {
    let resp = Request::get(url).send().await.map_err(js_err)?;
    let text = resp.text().await.map_err(js_err)?;
    serde_json::from_str(&text).map_err(js_err)
}
