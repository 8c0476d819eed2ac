//! Markers on a shared canvas: entity data, zoom scaling, screen geometry,
//! hit-testing and culling.

pub mod entity;
pub mod error;
pub mod geometry;
pub mod marker;
pub mod picking;
pub mod scale;
pub mod viewport;
pub mod visibility;
pub mod world;

pub use entity::EntityId;
pub use error::*;
pub use marker::{Glyph, Marker, MarkerOptions, Popup, content_id};
pub use viewport::{AffineViewport, Viewport};
pub use world::*;
