//! Grouped layer control: a two-level (group, layer) registry, radio and
//! checkbox selection against a map host, group tri-state, collapsible
//! groups and persisted UI state.

pub mod collapse;
pub mod control;
pub mod error;
pub mod host;
pub mod layer;
pub mod options;
pub mod registry;
pub mod state;
pub mod view;

pub use control::{ControlEvent, LayerControl};
pub use error::*;
pub use host::{ActiveLayers, LayerHost};
pub use layer::*;
pub use options::ControlOptions;
pub use registry::LayerRegistry;
pub use state::PersistedUiState;
