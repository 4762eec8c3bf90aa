//! Contract between the window runtime and the application.
//!
//! The runtime owns the event loop and GPU; an [`App`] gets one `on_init` once
//! the device exists, then `on_frame` with a [`FrameCtx`] on every redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
