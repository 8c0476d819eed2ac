pub mod latlng;
pub mod vec;

pub use latlng::*;
pub use vec::*;
