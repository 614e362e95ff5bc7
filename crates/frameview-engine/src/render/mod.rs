//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer owns its GPU resources (pipeline, buffers, textures).
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

mod common;
mod ctx;
mod image;
mod rect;
mod text;

pub use ctx::{RenderCtx, RenderTarget};
pub use image::{ImageRenderer, SourceImage};
pub use rect::RectRenderer;
pub use text::TextRenderer;
