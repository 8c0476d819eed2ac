use foundation::ids::MarkerId;
use foundation::math::{LatLng, Vec2};
use serde::{Deserialize, Serialize};
use storage::CompletionStore;
use tracing::{debug, warn};

use crate::error::MarkerError;
use crate::geometry::{BadgeSpec, CIRCLE_BADGE, ICON_BADGE, MarkerGeometry};
use crate::scale::ZoomScaling;
use crate::viewport::Viewport;

/// Natural radius of the fallback circle glyph.
pub const CIRCLE_RADIUS_PX: f64 = 5.0;
/// Natural hit/draw box side of the fallback circle glyph.
pub const CIRCLE_BOX_PX: f64 = 12.0;
/// Fill used for circle glyphs that carry no color.
pub const DEFAULT_CIRCLE_COLOR: &str = "#3388ff";

/// What a marker is drawn as.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Raster icon, referenced by URL. Drawable once its natural size is known.
    Icon { url: String },
    /// Primitive filled circle; drawable immediately.
    Circle { color: String },
}

impl Glyph {
    pub fn icon(url: impl Into<String>) -> Self {
        Glyph::Icon { url: url.into() }
    }

    pub fn circle(color: impl Into<String>) -> Self {
        Glyph::Circle {
            color: color.into(),
        }
    }

    /// Completion badge drawn over this glyph at natural scale.
    pub fn badge(&self) -> BadgeSpec {
        match self {
            Glyph::Icon { .. } => ICON_BADGE,
            Glyph::Circle { .. } => CIRCLE_BADGE,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerOptions {
    /// Pixel offset from the icon's top-left corner to its pin point.
    /// Defaults to half the natural icon size.
    pub icon_anchor: Option<[f64; 2]>,
    pub zoom_scaling: ZoomScaling,
}

/// Popup content attached to a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub description: String,
    pub position: String,
}

/// One point annotation on the shared canvas.
///
/// Plain data: drawing lives in the render crate, containment in
/// [`crate::picking`]. Both read [`Marker::geometry`].
#[derive(Debug, Clone)]
pub struct Marker {
    id: Option<MarkerId>,
    position: LatLng,
    glyph: Glyph,
    options: MarkerOptions,
    popup: Option<Popup>,
    natural_size: Option<Vec2>,
    anchor: Option<Vec2>,
    completed: bool,
    scale: f64,
    projected: Option<Vec2>,
    redraw_requested: bool,
}

impl Marker {
    pub fn new(id: Option<MarkerId>, position: LatLng, glyph: Glyph, options: MarkerOptions) -> Self {
        let mut marker = Self {
            id,
            position,
            glyph,
            options,
            popup: None,
            natural_size: None,
            anchor: None,
            completed: false,
            scale: 1.0,
            projected: None,
            redraw_requested: true,
        };
        if matches!(marker.glyph, Glyph::Circle { .. }) {
            let size = Vec2::new(CIRCLE_BOX_PX, CIRCLE_BOX_PX);
            marker.natural_size = Some(size);
            marker.anchor = Some(size.scale(0.5));
        }
        marker
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn id(&self) -> Option<&MarkerId> {
        self.id.as_ref()
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    pub fn options(&self) -> &MarkerOptions {
        &self.options
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Moves the marker; the cached pixel position is dropped until the next
    /// projection.
    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
        self.projected = None;
        self.redraw_requested = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// `"Complete"` / `"Incomplete"`, as shown in the popup status line.
    pub fn status_text(&self) -> &'static str {
        if self.completed { "Complete" } else { "Incomplete" }
    }

    /// Refreshes the cached completion flag from the store.
    pub fn sync_completion(&mut self, store: &CompletionStore) {
        let completed = self.id.as_ref().is_some_and(|id| store.has(id));
        if completed != self.completed {
            self.completed = completed;
            self.redraw_requested = true;
        }
    }

    /// Flips completion and records it in `store`.
    ///
    /// Without an id this is a logged no-op.
    pub fn toggle_completion(&mut self, store: &mut CompletionStore) -> Result<bool, MarkerError> {
        let Some(id) = self.id.as_ref() else {
            warn!(position = %self.position, "cannot toggle completion on a marker without id");
            return Err(MarkerError::MissingId);
        };
        if self.completed {
            store.remove(id);
        } else {
            store.add(id);
        }
        self.completed = !self.completed;
        self.redraw_requested = true;
        Ok(self.completed)
    }

    /// One-time icon load callback.
    ///
    /// An explicit anchor wins over the automatic half-size anchor. Returns
    /// `false` for repeated callbacks and for circle glyphs.
    pub fn on_icon_loaded(&mut self, natural_width: f64, natural_height: f64) -> bool {
        if !matches!(self.glyph, Glyph::Icon { .. }) || self.natural_size.is_some() {
            debug!(position = %self.position, "ignoring repeated icon load");
            return false;
        }
        let size = Vec2::new(natural_width, natural_height);
        let anchor = match self.options.icon_anchor {
            Some([ax, ay]) => Vec2::new(ax, ay),
            None => size.scale(0.5),
        };
        self.natural_size = Some(size);
        self.anchor = Some(anchor.round());
        self.redraw_requested = true;
        true
    }

    /// Drawable and hit-testable once the glyph size and anchor are known.
    pub fn is_ready(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Vec2> {
        self.anchor
    }

    pub fn natural_size(&self) -> Option<Vec2> {
        self.natural_size
    }

    /// Scale cached for the current zoom.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Re-resolves the cached scale after a zoom change.
    ///
    /// `scaling_allowed` is the user's global switch; when off every marker
    /// draws at `1.0`.
    pub fn update_scale(&mut self, zoom: Option<f64>, scaling_allowed: bool) {
        let scale = if scaling_allowed {
            self.options.zoom_scaling.scale_at(zoom)
        } else {
            1.0
        };
        if scale != self.scale {
            self.scale = scale;
            self.redraw_requested = true;
        }
    }

    /// Geometry at the cached scale, or `None` before the icon has loaded.
    pub fn geometry(&self) -> Option<MarkerGeometry> {
        let size = self.natural_size?;
        let anchor = self.anchor?;
        Some(MarkerGeometry::new(size, anchor, self.glyph.badge(), self.scale))
    }

    /// Projects the logical position and caches the pin point in pixels.
    pub fn project(&mut self, viewport: &dyn Viewport) -> Vec2 {
        let p = viewport.project_to_pixel(self.position);
        self.projected = Some(p);
        p
    }

    pub fn projected(&self) -> Option<Vec2> {
        self.projected
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

/// Stable id derived from a feature's semantic content.
///
/// Parts are length-prefixed before hashing so `["ab", "c"]` and
/// `["a", "bc"]` differ.
pub fn content_id(parts: &[&str]) -> Option<MarkerId> {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    let hex = hasher.finalize().to_hex();
    // A 32-hex-digit prefix is plenty for per-dataset uniqueness.
    MarkerId::new(&hex.as_str()[..32])
}
