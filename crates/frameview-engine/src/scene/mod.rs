//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands
//! - provide deterministic ordering (z-index, then insertion order)
//!
//! Extending the scene: add a command payload + variant in `cmd`, a push
//! helper on `DrawList`, and a matching renderer under `render`.

mod cmd;
mod key;
mod list;
mod z_index;

pub use cmd::{DrawCmd, ImageCmd, RectCmd, TextCmd};
pub use key::SortKey;
pub use list::{DrawItem, DrawList};
pub use z_index::ZIndex;
