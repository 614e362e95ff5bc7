//! Frame timestamping.
//!
//! One `FrameClock` per window. The clock stamps each presented frame with a
//! monotonic timestamp and a frame index; any rate accounting is done by the
//! consumers of those stamps.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameStamp};
