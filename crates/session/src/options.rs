use layers::ControlOptions;
use scene::scale::ZoomScaling;
use scene::visibility::DEFAULT_CULL_PADDING_PX;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    pub control: ControlOptions,
    /// Zoom scaling policy given to every marker.
    pub marker_scaling: ZoomScaling,
    /// Derive an id from the record content when the dataset has none.
    pub derive_missing_ids: bool,
    pub cull_padding_px: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            control: ControlOptions::default(),
            marker_scaling: ZoomScaling::default(),
            derive_missing_ids: false,
            cull_padding_px: DEFAULT_CULL_PADDING_PX,
        }
    }
}
