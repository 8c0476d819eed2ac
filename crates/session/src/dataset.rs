use foundation::ids::MarkerId;
use foundation::math::LatLng;
use scene::marker::DEFAULT_CIRCLE_COLOR;
use scene::{Glyph, Popup, content_id};
use serde::{Deserialize, Serialize};

/// Features of this category are map labels: no popup, no completion.
pub const LABELS_CATEGORY: &str = "Labels";

/// One parsed input feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    #[serde(default, alias = "hash")]
    pub id: Option<String>,
    pub position: LatLng,
    /// Category; the group box in the layer control.
    #[serde(alias = "category")]
    pub group: String,
    /// Subcategory; one overlay layer per (map layer, group, subgroup).
    #[serde(alias = "subcat")]
    pub subgroup: String,
    /// Base layer the feature belongs to.
    #[serde(alias = "map")]
    pub map_layer: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl FeatureRecord {
    /// The record's id, or with `derive` a content hash when it has none.
    pub fn marker_id(&self, derive: bool) -> Option<MarkerId> {
        if let Some(id) = self.id.as_deref().and_then(MarkerId::new) {
            return Some(id);
        }
        if !derive {
            return None;
        }
        let position = self.position.to_string();
        content_id(&[
            &self.map_layer,
            &self.group,
            &self.subgroup,
            self.title.as_deref().unwrap_or(""),
            &position,
        ])
    }

    /// Icon when present, otherwise a circle in the record's color.
    pub fn glyph(&self) -> Glyph {
        match &self.icon {
            Some(url) if !url.is_empty() => Glyph::icon(url.clone()),
            _ => Glyph::circle(self.color.as_deref().unwrap_or(DEFAULT_CIRCLE_COLOR)),
        }
    }

    pub fn is_label(&self) -> bool {
        self.group == LABELS_CATEGORY
    }

    pub fn popup(&self) -> Option<Popup> {
        let title = self.title.as_ref()?;
        if self.is_label() {
            return None;
        }
        Some(Popup {
            title: title.clone(),
            description: self.description.clone(),
            position: self.position.to_string(),
        })
    }
}

/// Outcome of a dataset load.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub spawned: usize,
    /// Markers created without an id; completion cannot be toggled on them.
    pub without_id: usize,
    pub duplicate_ids: usize,
}
