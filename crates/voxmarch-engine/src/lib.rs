//! voxmarch engine crate.
//!
//! Platform + GPU runtime pieces (device, window loop, input, time, logging)
//! and the renderer core they drive:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`volume`] | `VoxelVolume`, `Palette`, fill rules, `.vox` import |
//! | [`camera`] | `Camera` and its view/projection inverses |
//! | [`accum`] | `FrameAccumulator` |
//! | [`noise`] | jitter noise layers |
//! | [`render`] | `TraceDispatcher`, `Presenter`, shader compilation |

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;

pub mod accum;
pub mod camera;
pub mod noise;
pub mod volume;
