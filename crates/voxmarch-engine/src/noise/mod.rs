//! Jitter noise for the ray-marcher.
//!
//! The kernel reads one layer of a 2D texture array per frame
//! (`frameCount % layers`) to decorrelate sub-pixel jitter and stochastic
//! shading across frames. Layers are either generated white noise or a
//! directory of precomputed blue-noise images.

mod error;

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub use error::NoiseError;

/// Where noise layers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseSource {
    /// `layers` square layers of `extent × extent` random RGBA8 texels.
    White { layers: u32, extent: u32, seed: u64 },
    /// Every image file in a directory, one layer each, in file-name order.
    BlueNoiseDir(PathBuf),
}

impl Default for NoiseSource {
    fn default() -> Self {
        NoiseSource::White {
            layers: 16,
            extent: 64,
            seed: 0x5eed,
        }
    }
}

/// CPU-side RGBA8 noise layers, tightly packed layer after layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseLayers {
    width: u32,
    height: u32,
    layers: u32,
    texels: Vec<u8>,
}

impl NoiseLayers {
    pub fn load(source: &NoiseSource) -> Result<Self, NoiseError> {
        match source {
            NoiseSource::White { layers, extent, seed } => Self::white(*layers, *extent, *seed),
            NoiseSource::BlueNoiseDir(dir) => Self::from_dir(dir),
        }
    }

    pub fn white(layers: u32, extent: u32, seed: u64) -> Result<Self, NoiseError> {
        if layers == 0 || extent == 0 {
            return Err(NoiseError::Empty);
        }
        let mut texels = vec![0u8; extent as usize * extent as usize * layers as usize * 4];
        StdRng::seed_from_u64(seed).fill_bytes(&mut texels);
        log::debug!("generated {layers} white noise layers ({extent}x{extent})");
        Ok(Self {
            width: extent,
            height: extent,
            layers,
            texels,
        })
    }

    /// Loads every file in `dir` as one layer. Files are sorted by name.
    pub fn from_dir(dir: &Path) -> Result<Self, NoiseError> {
        let io_err = |source| NoiseError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut layers: Option<Self> = None;
        for path in paths {
            let img = image::open(&path)
                .map_err(|source| NoiseError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            let (w, h) = img.dimensions();

            match layers.as_mut() {
                None => {
                    layers = Some(Self {
                        width: w,
                        height: h,
                        layers: 1,
                        texels: img.into_raw(),
                    });
                }
                Some(l) => {
                    if (w, h) != (l.width, l.height) {
                        return Err(NoiseError::MismatchedLayer {
                            path,
                            expected: (l.width, l.height),
                            found: (w, h),
                        });
                    }
                    l.texels.extend_from_slice(img.as_raw());
                    l.layers += 1;
                }
            }
        }

        let layers = layers.ok_or(NoiseError::Empty)?;
        log::info!(
            "loaded {} blue noise layers ({}x{}) from {}",
            layers.layers,
            layers.width,
            layers.height,
            dir.display()
        );
        Ok(layers)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    #[inline]
    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    /// RGBA texels of one layer.
    pub fn layer(&self, index: u32) -> Option<&[u8]> {
        if index >= self.layers {
            return None;
        }
        let len = self.width as usize * self.height as usize * 4;
        let start = index as usize * len;
        Some(&self.texels[start..start + len])
    }

    /// Uploads the layers into an `Rgba8Unorm` 2D array texture.
    pub fn upload(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: self.layers,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("voxmarch noise layers"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            size,
        );
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxmarch-noise-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, w: u32, h: u32, fill: [u8; 4]) {
        image::RgbaImage::from_pixel(w, h, image::Rgba(fill)).save(path).unwrap();
    }

    // ── white noise ───────────────────────────────────────────────────────

    #[test]
    fn white_noise_has_requested_shape() {
        let n = NoiseLayers::white(4, 8, 1).unwrap();
        assert_eq!((n.width(), n.height(), n.layers()), (8, 8, 4));
        assert_eq!(n.texels().len(), 8 * 8 * 4 * 4);
        assert_eq!(n.layer(3).unwrap().len(), 8 * 8 * 4);
        assert!(n.layer(4).is_none());
    }

    #[test]
    fn white_noise_is_seeded() {
        assert_eq!(NoiseLayers::white(2, 16, 9).unwrap(), NoiseLayers::white(2, 16, 9).unwrap());
        assert_ne!(NoiseLayers::white(2, 16, 9).unwrap(), NoiseLayers::white(2, 16, 10).unwrap());
    }

    #[test]
    fn white_noise_layers_differ() {
        let n = NoiseLayers::white(2, 16, 3).unwrap();
        assert_ne!(n.layer(0), n.layer(1));
    }

    #[test]
    fn zero_layers_is_empty() {
        assert!(matches!(NoiseLayers::white(0, 64, 1), Err(NoiseError::Empty)));
        assert!(matches!(NoiseLayers::white(4, 0, 1), Err(NoiseError::Empty)));
    }

    #[test]
    fn default_source_is_white() {
        let n = NoiseLayers::load(&NoiseSource::default()).unwrap();
        assert_eq!((n.width(), n.layers()), (64, 16));
    }

    // ── image directory ───────────────────────────────────────────────────

    #[test]
    fn directory_layers_follow_file_name_order() {
        let dir = scratch_dir("order");
        write_png(&dir.join("b.png"), 2, 2, [20, 0, 0, 255]);
        write_png(&dir.join("a.png"), 2, 2, [10, 0, 0, 255]);

        let n = NoiseLayers::from_dir(&dir).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(n.layers(), 2);
        assert_eq!(n.layer(0).unwrap()[0], 10);
        assert_eq!(n.layer(1).unwrap()[0], 20);
    }

    #[test]
    fn mismatched_image_is_rejected() {
        let dir = scratch_dir("mismatch");
        write_png(&dir.join("0.png"), 4, 4, [0; 4]);
        write_png(&dir.join("1.png"), 2, 4, [0; 4]);

        let err = NoiseLayers::from_dir(&dir).unwrap_err();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(matches!(
            err,
            NoiseError::MismatchedLayer { expected: (4, 4), found: (2, 4), .. }
        ));
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = scratch_dir("empty");
        let err = NoiseLayers::from_dir(&dir).unwrap_err();
        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(err, NoiseError::Empty));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = NoiseLayers::from_dir(Path::new("/nonexistent/noise")).unwrap_err();
        assert!(matches!(err, NoiseError::Io { .. }));
    }
}
