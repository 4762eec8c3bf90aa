use std::path::PathBuf;

use glam::{UVec3, Vec3};

use voxmarch_engine::noise::NoiseSource;
use voxmarch_engine::render::LightingParams;
use voxmarch_engine::volume::{SphereShell, VolumeError, VoxelVolume};

/// Where the traced volume comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Ball of random colors in a floor-and-walls shell, centered in the grid.
    Procedural { size: UVec3, radius: f32, seed: u64 },
    /// A `.vox` model file.
    VoxFile(PathBuf),
}

impl ModelSource {
    pub fn load(&self) -> Result<VoxelVolume, VolumeError> {
        match self {
            ModelSource::Procedural { size, radius, seed } => {
                let mut rule = SphereShell::new(size.as_vec3() * 0.5, *radius, *seed);
                let volume = VoxelVolume::build(*size, &mut rule)?;
                log::info!(
                    "generated {}x{}x{} sphere scene ({} occupied cells)",
                    size.x,
                    size.y,
                    size.z,
                    volume.occupied_count()
                );
                Ok(volume)
            }
            ModelSource::VoxFile(path) => VoxelVolume::load_from_file(path),
        }
    }
}

/// Initial camera placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraSetup {
    At { position: Vec3, focus: Vec3 },
    /// Look at the volume center from the front-left, far enough to see all of it.
    FrameVolume,
}

impl CameraSetup {
    /// Offset direction used by [`CameraSetup::FrameVolume`].
    const FRAME_DIR: Vec3 = Vec3::new(-16.0, 0.0, 24.0);

    /// Resolves to `(position, focus)` for a volume of extent `size`.
    pub fn resolve(&self, size: UVec3) -> (Vec3, Vec3) {
        match *self {
            CameraSetup::At { position, focus } => (position, focus),
            CameraSetup::FrameVolume => {
                let focus = size.as_vec3() * 0.5;
                let distance = size.max_element() as f32 * 0.9;
                (focus + Self::FRAME_DIR.normalize() * distance, focus)
            }
        }
    }
}

/// Everything one viewer run needs: model, camera, lighting and window setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub size: (u32, u32),
    pub model: ModelSource,
    pub camera: CameraSetup,
    pub lighting: LightingParams,
    pub noise: NoiseSource,
    /// Progressive accumulation on at startup.
    pub accumulate: bool,
    /// Camera auto-orbit on at startup.
    pub auto_orbit: bool,
    pub vsync: bool,
}

impl SceneConfig {
    /// 32³ procedural sphere scene.
    pub fn sphere_demo() -> Self {
        Self {
            title: "voxmarch".to_string(),
            size: (800, 600),
            model: ModelSource::Procedural {
                size: UVec3::splat(32),
                radius: 14.0,
                seed: 1,
            },
            camera: CameraSetup::At {
                position: Vec3::new(0.0, 16.0, 40.0),
                focus: Vec3::splat(16.0),
            },
            lighting: LightingParams::default(),
            noise: NoiseSource::default(),
            accumulate: true,
            auto_orbit: false,
            vsync: false,
        }
    }

    /// A `.vox` model, framed automatically.
    pub fn vox_model(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = match path.file_name() {
            Some(name) => format!("voxmarch - {}", name.to_string_lossy()),
            None => "voxmarch".to_string(),
        };
        Self {
            title,
            model: ModelSource::VoxFile(path),
            camera: CameraSetup::FrameVolume,
            ..Self::sphere_demo()
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::sphere_demo()
    }
}
