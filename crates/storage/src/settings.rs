use tracing::warn;

use crate::{KeyValueStore, SharedStore, ZOOM_SCALING_KEY};

/// User display preferences persisted next to the completion set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub zoom_scaling_enabled: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            zoom_scaling_enabled: true,
        }
    }
}

impl DisplaySettings {
    /// Reads settings; anything missing or unparsable falls back to defaults.
    pub fn load(store: &SharedStore) -> Self {
        let mut settings = Self::default();
        match store.borrow().get_item(ZOOM_SCALING_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<bool>() {
                Ok(v) => settings.zoom_scaling_enabled = v,
                Err(_) => warn!(key = ZOOM_SCALING_KEY, value = %raw, "ignoring invalid setting"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = ZOOM_SCALING_KEY, error = %e, "settings unreadable"),
        }
        settings
    }

    /// Best-effort write; failures are logged.
    pub fn save(&self, store: &SharedStore) {
        let value = if self.zoom_scaling_enabled { "true" } else { "false" };
        if let Err(e) = store.borrow_mut().set_item(ZOOM_SCALING_KEY, value) {
            warn!(key = ZOOM_SCALING_KEY, error = %e, "failed to persist settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DisplaySettings;
    use crate::{InMemoryStore, KeyValueStore, ZOOM_SCALING_KEY, shared};

    #[test]
    fn defaults_when_missing() {
        let store = shared(InMemoryStore::new());
        assert!(DisplaySettings::load(&store).zoom_scaling_enabled);
    }

    #[test]
    fn save_then_load() {
        let store = shared(InMemoryStore::new());
        DisplaySettings {
            zoom_scaling_enabled: false,
        }
        .save(&store);
        assert_eq!(
            store.borrow().get_item(ZOOM_SCALING_KEY).unwrap().as_deref(),
            Some("false")
        );
        assert!(!DisplaySettings::load(&store).zoom_scaling_enabled);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let store = shared(InMemoryStore::new());
        store.borrow_mut().set_item(ZOOM_SCALING_KEY, "maybe").unwrap();
        assert!(DisplaySettings::load(&store).zoom_scaling_enabled);
    }
}
