//! Paint types shared between the scene and the renderers.

mod color;

pub use color::Color;
