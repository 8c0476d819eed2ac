pub mod canvas;
pub mod marker_pass;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use canvas::*;
pub use marker_pass::*;
#[cfg(target_arch = "wasm32")]
pub use web::WebCanvas;
