//! GPU rendering subsystem.
//!
//! One frame is two passes recorded into the same encoder:
//! - [`TraceDispatcher::dispatch`] runs the ray-march kernel into the
//!   accumulation image and returns a [`TracedImage`] once its pass is closed
//! - [`Presenter::present`] consumes that token and draws the image to the surface
//!
//! Each renderer owns its GPU resources (pipelines, buffers, textures).

mod ctx;
mod present;
mod shader;
mod trace;

pub use ctx::{RenderCtx, RenderTarget};
pub use present::Presenter;
pub use shader::{compile_wgsl, ShaderError};
pub use trace::{
    output_extent, output_needs_realloc, workgroup_count, LightingParams, TraceDispatcher,
    TraceUniforms, TracedImage, OUTPUT_FORMAT, REQUIRED_FEATURES, WORKGROUP_SIZE,
};
