//! Durable key-value persistence for map state.
//!
//! Everything here is best-effort: callers log and swallow [`StorageError`]s
//! and keep their in-memory state authoritative for the session.

pub mod completion;
pub mod kv;
pub mod settings;

pub use completion::*;
pub use kv::*;
pub use settings::*;

/// Key holding the JSON array of completed marker ids.
pub const COMPLETED_MARKERS_KEY: &str = "completedMarkers";
/// Key holding the global zoom-scaling flag (`"true"` / `"false"`).
pub const ZOOM_SCALING_KEY: &str = "zoomScalingEnabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    Unavailable,
    QuotaExceeded { key: String, needed: usize, limit: usize },
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "browser storage unavailable"),
            StorageError::QuotaExceeded { key, needed, limit } => {
                write!(f, "storage quota exceeded writing {key:?} ({needed} > {limit} bytes)")
            }
            StorageError::Corrupt(msg) => write!(f, "stored value corrupt: {msg}"),
            StorageError::Io(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}
