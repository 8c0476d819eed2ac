use layers::ControlError;
use scene::{EntityId, MarkerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownMarker(EntityId),
    /// The marker has no popup to carry its completion status.
    MissingPopup(EntityId),
    UnknownBaseLayer(String),
    Marker(MarkerError),
    Control(ControlError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownMarker(e) => write!(f, "unknown marker: {e}"),
            SessionError::MissingPopup(e) => write!(f, "marker has no popup: {e}"),
            SessionError::UnknownBaseLayer(n) => write!(f, "unknown base layer: {n}"),
            SessionError::Marker(e) => write!(f, "marker error: {e}"),
            SessionError::Control(e) => write!(f, "layer control error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Marker(e) => Some(e),
            SessionError::Control(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MarkerError> for SessionError {
    fn from(e: MarkerError) -> Self {
        SessionError::Marker(e)
    }
}

impl From<ControlError> for SessionError {
    fn from(e: ControlError) -> Self {
        SessionError::Control(e)
    }
}
