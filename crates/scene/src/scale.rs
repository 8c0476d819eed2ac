//! Zoom-dependent marker scaling.
//!
//! Scales are snapped to a small fixed ladder so icons are only ever drawn at
//! a handful of bitmap sizes.

use serde::{Deserialize, Serialize};

/// The only scale factors a marker is ever drawn at, ascending.
pub const SCALE_LADDER: [f64; 7] = [0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Growth factor per zoom level away from the base zoom.
pub const SCALE_PER_ZOOM: f64 = 1.2;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomScaling {
    pub enabled: bool,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Zoom level at which the icon is drawn at its natural size.
    pub base_zoom: f64,
}

impl Default for ZoomScaling {
    fn default() -> Self {
        Self {
            enabled: true,
            min_scale: 0.5,
            max_scale: 2.0,
            base_zoom: 5.0,
        }
    }
}

impl ZoomScaling {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Scale for `zoom`; fixed at `1.0` when disabled or without a viewport zoom.
    pub fn scale_at(&self, zoom: Option<f64>) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        match zoom {
            Some(zoom) => resolve_scale(zoom, self.base_zoom, self.min_scale, self.max_scale),
            None => 1.0,
        }
    }
}

/// `1.2^(zoom - base)`, clamped to `[min, max]`, snapped to [`SCALE_LADDER`].
///
/// Never panics: inverted bounds resolve to `max_scale`, and a non-numeric
/// zoom yields `1.0`.
pub fn resolve_scale(current_zoom: f64, base_zoom: f64, min_scale: f64, max_scale: f64) -> f64 {
    let diff = current_zoom - base_zoom;
    if diff.is_nan() {
        return 1.0;
    }
    let raw = SCALE_PER_ZOOM.powf(diff);
    snap_to_ladder(raw.max(min_scale).min(max_scale))
}

/// Nearest ladder step by absolute difference; ties go to the lower step.
pub fn snap_to_ladder(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    let mut best = SCALE_LADDER[0];
    let mut best_diff = (value - best).abs();
    for &step in &SCALE_LADDER[1..] {
        let diff = (value - step).abs();
        if diff < best_diff {
            best = step;
            best_diff = diff;
        }
    }
    best
}
