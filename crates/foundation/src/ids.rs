use serde::{Deserialize, Serialize};

/// Stable identifier of a dataset feature (a hash of its semantic content).
///
/// This is the canonical key of the completion set.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    /// Returns `None` for blank ids; a blank id is treated as "no id".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(MarkerId(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerId;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(MarkerId::new("").is_none());
        assert!(MarkerId::new("   ").is_none());
        assert_eq!(MarkerId::new("abc").unwrap().as_str(), "abc");
    }
}
