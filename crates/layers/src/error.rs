use crate::layer::LayerHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    UnknownLayer(LayerHandle),
    UnknownGroup(String),
    /// Exclusive and base groups have no group checkbox.
    GroupNotToggleable(String),
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::UnknownLayer(h) => write!(f, "unknown layer: {h}"),
            ControlError::UnknownGroup(g) => write!(f, "unknown group: {g}"),
            ControlError::GroupNotToggleable(g) => write!(f, "group has no checkbox: {g}"),
        }
    }
}

impl std::error::Error for ControlError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    Corrupt(String),
    Encode(String),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Corrupt(msg) => write!(f, "corrupt layer state: {msg}"),
            StateError::Encode(msg) => write!(f, "layer state encode failed: {msg}"),
        }
    }
}

impl std::error::Error for StateError {}
