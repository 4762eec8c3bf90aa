//! Time subsystem.
//!
//! The runtime ticks one `FrameClock` per window and hands the resulting
//! `FrameTime` to the app. `FpsCounter` produces the once-per-second frame
//! rate report.

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
