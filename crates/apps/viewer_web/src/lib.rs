//! Browser entry points: one map session drawn on a 2D canvas.

#[cfg(target_arch = "wasm32")]
mod app;
