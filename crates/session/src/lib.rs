//! One interactive map: markers on a shared canvas plus the grouped layer
//! control, wired to injected storage and map collaborators.

pub mod dataset;
pub mod error;
pub mod options;
pub mod pointer;
pub mod session;

pub use dataset::{FeatureRecord, LoadReport};
pub use error::SessionError;
pub use options::SessionOptions;
pub use pointer::{Command, PointerKind};
pub use session::{MapSession, PopupView};
