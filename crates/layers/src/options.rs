use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Name ordering used when sorting layers and groups.
pub type SortFunction = fn(&str, &str) -> Ordering;

pub fn lexicographic(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

pub const DEFAULT_STATE_KEY: &str = "leafletGroupedLayersState";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlOptions {
    pub sort_layers: bool,
    pub sort_groups: bool,
    pub sort_base_layers: bool,
    /// Overlay groups with radio semantics.
    pub exclusive_groups: Vec<String>,
    /// Tri-state checkbox on every non-exclusive overlay group.
    pub group_checkboxes: bool,
    pub groups_collapsable: bool,
    /// Hide the base section when it holds a single layer.
    pub hide_single_base: bool,
    pub state_persistence: bool,
    pub state_key: String,
    pub restore_delay_ms: u64,
    #[serde(skip)]
    pub sort_function: SortFunction,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            sort_layers: true,
            sort_groups: true,
            sort_base_layers: false,
            exclusive_groups: Vec::new(),
            group_checkboxes: false,
            groups_collapsable: false,
            hide_single_base: false,
            state_persistence: true,
            state_key: DEFAULT_STATE_KEY.to_string(),
            restore_delay_ms: 100,
            sort_function: lexicographic,
        }
    }
}

impl ControlOptions {
    pub fn is_exclusive(&self, group: &str) -> bool {
        self.exclusive_groups.iter().any(|g| g == group)
    }
}

#[cfg(test)]
mod tests {
    use super::ControlOptions;

    #[test]
    fn partial_json_keeps_defaults() {
        let o: ControlOptions =
            serde_json::from_str(r#"{"groupCheckboxes":true,"exclusiveGroups":["Regions"]}"#).unwrap();
        assert!(o.group_checkboxes);
        assert!(o.sort_layers);
        assert!(o.is_exclusive("Regions"));
        assert!(!o.is_exclusive("Shrines"));
        assert_eq!(o.state_key, "leafletGroupedLayersState");
        assert_eq!(o.restore_delay_ms, 100);
        assert_eq!((o.sort_function)("a", "b"), std::cmp::Ordering::Less);
    }
}
