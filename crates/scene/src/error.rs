#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerError {
    /// The marker has no identity to key completion state on.
    MissingId,
}

impl std::fmt::Display for MarkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerError::MissingId => write!(f, "marker has no id"),
        }
    }
}

impl std::error::Error for MarkerError {}
