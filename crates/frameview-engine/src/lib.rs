//! Frameview engine crate.
//!
//! Owns the platform and GPU runtime pieces the HUD layer and the viewer
//! binary build on: window/event loop, surface management, scene recording,
//! renderers, frame timestamping, and logging setup.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod text;
