use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};
use wgpu::util::DeviceExt;

use crate::accum::FrameAccumulator;
use crate::camera::Camera;
use crate::noise::NoiseLayers;
use crate::volume::VoxelVolume;

use super::shader::{compile_wgsl, ShaderError};

/// Pixels covered by one compute workgroup along each screen axis.
pub const WORKGROUP_SIZE: u32 = 8;

/// Format of the accumulation image.
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Device features the dispatcher needs (read-write `rgba32float` storage).
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;

/// Workgroup grid covering a `width × height` image.
#[inline]
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32, u32) {
    (
        width.div_ceil(WORKGROUP_SIZE),
        height.div_ceil(WORKGROUP_SIZE),
        1,
    )
}

/// Accumulation image extent for a `width × height` surface. Never zero.
#[inline]
pub fn output_extent(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}

/// Whether an image of extent `current` must be replaced for a `width × height`
/// surface. A replacement starts blank, so accumulation must restart with it.
#[inline]
pub fn output_needs_realloc(current: Option<(u32, u32)>, width: u32, height: u32) -> bool {
    current != Some(output_extent(width, height))
}

// ── lighting ──────────────────────────────────────────────────────────────

/// Shading parameters published to the kernel every frame.
///
/// Any change to these must be followed by [`FrameAccumulator::invalidate`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightingParams {
    /// Diffuse bounces after the primary hit. 0 means direct light only.
    pub num_ray_bounces: u32,
    /// DDA step cap per ray; running out counts as a miss.
    pub max_dda_depth: u32,
    /// Unit vector pointing toward the sun.
    pub sun_dir: Vec3,
    pub enable_shadows: bool,
    /// Fraction of direct light that reaches shadowed surfaces.
    pub shadow_multiplier: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            num_ray_bounces: 1,
            max_dda_depth: 256,
            sun_dir: Vec3::new(-0.4, 1.0, 0.6).normalize(),
            enable_shadows: true,
            shadow_multiplier: 0.35,
        }
    }
}

// ── uniform block ─────────────────────────────────────────────────────────

/// CPU mirror of the kernel's `TraceParams` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TraceUniforms {
    pub inv_view: [[f32; 4]; 4],
    pub inv_centered_view: [[f32; 4]; 4],
    pub inv_projection: [[f32; 4]; 4],
    pub map_size: [u32; 3],
    pub frame_count: u32,
    pub sample_count: u32,
    pub num_ray_bounces: u32,
    pub max_dda_depth: u32,
    pub enable_shadows: u32,
    pub sun_dir: [f32; 3],
    pub shadow_multiplier: f32,
}

impl TraceUniforms {
    pub fn new(
        map_size: UVec3,
        camera: &Camera,
        accumulator: &FrameAccumulator,
        lighting: &LightingParams,
    ) -> Self {
        let m = camera.matrices();
        Self {
            inv_view: m.inv_view.to_cols_array_2d(),
            inv_centered_view: m.inv_centered_view.to_cols_array_2d(),
            inv_projection: m.inv_projection.to_cols_array_2d(),
            map_size: map_size.to_array(),
            // Only used as a noise seed; wrapping is harmless.
            frame_count: accumulator.global_frame_count() as u32,
            sample_count: accumulator.sample_count(),
            num_ray_bounces: lighting.num_ray_bounces,
            max_dda_depth: lighting.max_dda_depth,
            enable_shadows: lighting.enable_shadows as u32,
            sun_dir: lighting.sun_dir.normalize_or(Vec3::Y).to_array(),
            shadow_multiplier: lighting.shadow_multiplier,
        }
    }
}

// ── dispatcher ────────────────────────────────────────────────────────────

/// Proof that the trace pass for this frame has been recorded and closed.
///
/// Only [`TraceDispatcher::dispatch`] creates one, after its compute pass has
/// ended. Passes recorded later in the same encoder are ordered after the
/// kernel's image writes, so holding this token is what allows the image to
/// be read.
#[derive(Debug, Copy, Clone)]
pub struct TracedImage<'a> {
    view: &'a wgpu::TextureView,
    size: (u32, u32),
    generation: u64,
}

impl<'a> TracedImage<'a> {
    #[inline]
    pub fn view(&self) -> &'a wgpu::TextureView {
        self.view
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Changes whenever the underlying image is reallocated.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct OutputImage {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
    generation: u64,
}

/// Owns the ray-march kernel and the GPU copies of everything it reads.
///
/// The volume and palette are uploaded once; the accumulation image follows
/// the surface size via [`ensure_output`](Self::ensure_output).
pub struct TraceDispatcher {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,

    params_ubo: wgpu::Buffer,
    voxel_buffer: wgpu::Buffer,
    palette_buffer: wgpu::Buffer,
    _noise_texture: wgpu::Texture,
    noise_view: wgpu::TextureView,

    map_size: UVec3,
    output: Option<OutputImage>,
    generations: u64,
}

impl TraceDispatcher {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &VoxelVolume,
        noise: &NoiseLayers,
    ) -> Result<Self, ShaderError> {
        let shader = compile_wgsl(device, "trace.wgsl", include_str!("shaders/trace.wgsl"))?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("voxmarch trace bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<TraceUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::ReadWrite,
                        format: OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("voxmarch trace pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("voxmarch trace pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("voxmarch trace params"),
            size: std::mem::size_of::<TraceUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let voxel_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxmarch voxel indices"),
            contents: bytemuck::cast_slice(&volume.packed_words()),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let palette_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxmarch palette"),
            contents: bytemuck::cast_slice(volume.palette().as_slice()),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let noise_texture = noise.upload(device, queue);
        let noise_view = noise_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("voxmarch noise view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        log::debug!(
            "trace dispatcher ready: volume {}x{}x{}, noise {} layers",
            volume.size().x,
            volume.size().y,
            volume.size().z,
            noise.layers()
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            params_ubo,
            voxel_buffer,
            palette_buffer,
            _noise_texture: noise_texture,
            noise_view,
            map_size: volume.size(),
            output: None,
            generations: 0,
        })
    }

    #[inline]
    pub fn map_size(&self) -> UVec3 {
        self.map_size
    }

    /// Current accumulation image size, if one is allocated.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output.as_ref().map(|o| o.size)
    }

    /// (Re)allocates the accumulation image when the requested size differs.
    ///
    /// Returns `true` when a new image was created; its contents are blank, so
    /// the caller must invalidate accumulation.
    pub fn ensure_output(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if !output_needs_realloc(self.output_size(), width, height) {
            return false;
        }
        let size = output_extent(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("voxmarch accumulation image"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("voxmarch trace bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.voxel_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.palette_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&self.noise_view),
                },
            ],
        });

        self.generations += 1;
        log::debug!("allocated {}x{} accumulation image", size.0, size.1);
        self.output = Some(OutputImage {
            _texture: texture,
            view,
            bind_group,
            size,
            generation: self.generations,
        });
        true
    }

    /// Re-uploads voxel indices and palette after programmatic edits.
    ///
    /// Returns `false` (and uploads nothing) when the volume extent changed;
    /// a different extent needs a new dispatcher.
    pub fn update_volume(&self, queue: &wgpu::Queue, volume: &VoxelVolume) -> bool {
        if volume.size() != self.map_size {
            log::warn!("volume extent changed; edits not uploaded");
            return false;
        }
        queue.write_buffer(&self.voxel_buffer, 0, bytemuck::cast_slice(&volume.packed_words()));
        queue.write_buffer(
            &self.palette_buffer,
            0,
            bytemuck::cast_slice(volume.palette().as_slice()),
        );
        true
    }

    /// Records one trace of the whole image into `encoder`.
    ///
    /// Publishes the camera inverses, counters and lighting, dispatches one
    /// invocation per pixel, and closes the compute pass before returning the
    /// token the presenter needs. Returns `None` if no image is allocated yet.
    pub fn dispatch(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        camera: &Camera,
        accumulator: &FrameAccumulator,
        lighting: &LightingParams,
    ) -> Option<TracedImage<'_>> {
        let output = self.output.as_ref()?;

        let uniforms = TraceUniforms::new(self.map_size, camera, accumulator, lighting);
        queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&uniforms));

        let (gx, gy, gz) = workgroup_count(output.size.0, output.size.1);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("voxmarch trace pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &output.bind_group, &[]);
            pass.dispatch_workgroups(gx, gy, gz);
        }

        Some(TracedImage {
            view: &output.view,
            size: output.size,
            generation: output.generation,
        })
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use glam::Mat4;

    use super::*;

    // ── uniform layout ────────────────────────────────────────────────────

    #[test]
    fn uniform_block_matches_kernel_layout() {
        assert_eq!(size_of::<TraceUniforms>(), 240);
        assert_eq!(offset_of!(TraceUniforms, inv_view), 0);
        assert_eq!(offset_of!(TraceUniforms, inv_centered_view), 64);
        assert_eq!(offset_of!(TraceUniforms, inv_projection), 128);
        assert_eq!(offset_of!(TraceUniforms, map_size), 192);
        assert_eq!(offset_of!(TraceUniforms, frame_count), 204);
        assert_eq!(offset_of!(TraceUniforms, sample_count), 208);
        assert_eq!(offset_of!(TraceUniforms, num_ray_bounces), 212);
        assert_eq!(offset_of!(TraceUniforms, max_dda_depth), 216);
        assert_eq!(offset_of!(TraceUniforms, enable_shadows), 220);
        assert_eq!(offset_of!(TraceUniforms, sun_dir), 224);
        assert_eq!(offset_of!(TraceUniforms, shadow_multiplier), 236);
    }

    #[test]
    fn uniforms_carry_camera_counters_and_lighting() {
        let camera = Camera::new(Vec3::new(0.0, 16.0, 40.0), Vec3::splat(16.0), 800, 600);
        let mut acc = FrameAccumulator::new();
        acc.tick();
        acc.tick();
        let lighting = LightingParams {
            enable_shadows: false,
            num_ray_bounces: 3,
            ..LightingParams::default()
        };

        let u = TraceUniforms::new(UVec3::new(32, 16, 8), &camera, &acc, &lighting);

        let m = camera.matrices();
        assert_eq!(Mat4::from_cols_array_2d(&u.inv_view), m.inv_view);
        assert_eq!(Mat4::from_cols_array_2d(&u.inv_centered_view), m.inv_centered_view);
        assert_eq!(Mat4::from_cols_array_2d(&u.inv_projection), m.inv_projection);
        assert_eq!(u.map_size, [32, 16, 8]);
        assert_eq!(u.frame_count, 2);
        assert_eq!(u.sample_count, 2);
        assert_eq!(u.num_ray_bounces, 3);
        assert_eq!(u.max_dda_depth, 256);
        assert_eq!(u.enable_shadows, 0);
        assert!((Vec3::from_array(u.sun_dir).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_sun_direction_falls_back_to_up() {
        let camera = Camera::new(Vec3::Z, Vec3::ZERO, 1, 1);
        let lighting = LightingParams {
            sun_dir: Vec3::ZERO,
            ..LightingParams::default()
        };
        let u = TraceUniforms::new(UVec3::ONE, &camera, &FrameAccumulator::new(), &lighting);
        assert_eq!(u.sun_dir, [0.0, 1.0, 0.0]);
    }

    // ── dispatch sizing ───────────────────────────────────────────────────

    #[test]
    fn workgroups_cover_every_pixel() {
        assert_eq!(workgroup_count(800, 600), (100, 75, 1));
        assert_eq!(workgroup_count(801, 601), (101, 76, 1));
        assert_eq!(workgroup_count(1, 1), (1, 1, 1));
        assert_eq!(workgroup_count(1920, 1010), (240, 127, 1));
    }

    #[test]
    fn output_realloc_only_on_extent_change() {
        assert!(output_needs_realloc(None, 800, 600));
        assert!(!output_needs_realloc(Some((800, 600)), 800, 600));
        assert!(output_needs_realloc(Some((800, 600)), 801, 600));
        // A zero-height surface maps onto the 1-pixel minimum.
        assert_eq!(output_extent(640, 0), (640, 1));
        assert!(!output_needs_realloc(Some((640, 1)), 640, 0));
    }

    #[test]
    fn default_lighting() {
        let l = LightingParams::default();
        assert_eq!(l.num_ray_bounces, 1);
        assert_eq!(l.max_dda_depth, 256);
        assert!(l.enable_shadows);
        assert!((l.sun_dir.length() - 1.0).abs() < 1e-6);
        assert!(l.sun_dir.y > 0.0);
    }
}
