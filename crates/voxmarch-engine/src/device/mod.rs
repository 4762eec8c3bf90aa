//! GPU device + surface management.
//!
//! Adapter and device selection (with feature and storage-format checks),
//! surface configuration, and per-frame acquire/submit.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
