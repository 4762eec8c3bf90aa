//! Voxel volume: the occupancy / palette-index grid traced by the renderer.
//!
//! Sources:
//! - procedural fill rules ([`FillRule`], [`SphereShell`])
//! - `.vox` model files (parsed by `voxmarch-vox`, remapped into engine axes)

mod error;
mod fill;
mod grid;
mod palette;

pub use error::VolumeError;
pub use fill::{FillRule, SphereShell};
pub use grid::VoxelVolume;
pub use palette::{Palette, DEFAULT_PALETTE};
