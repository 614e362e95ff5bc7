//! HUD layer: frame-rate sampling, the one-shot resolution readout, and the
//! overlay that paints both over the displayed image.
//!
//! Everything here is host-agnostic: timestamps are passed in, outputs go
//! through [`sink::TextSink`], and teardown is driven by [`cancel::StopToken`].
//! The viewer binary wires these to the engine's frame loop.

pub mod cancel;
pub mod overlay;
pub mod probe;
pub mod sampler;
pub mod sink;

pub use cancel::StopToken;
pub use overlay::Hud;
pub use probe::{ResolutionProbe, ResolutionReport};
pub use sampler::FpsSampler;
pub use sink::{TextField, TextSink};
