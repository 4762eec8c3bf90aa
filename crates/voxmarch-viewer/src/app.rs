use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use winit::dpi::LogicalSize;

use voxmarch_engine::accum::FrameAccumulator;
use voxmarch_engine::camera::Camera;
use voxmarch_engine::core::{App as EngineApp, AppControl, FrameCtx, WindowCtx};
use voxmarch_engine::device::{Gpu, GpuInit};
use voxmarch_engine::noise::NoiseLayers;
use voxmarch_engine::render::{
    output_needs_realloc, LightingParams, Presenter, TraceDispatcher, OUTPUT_FORMAT,
    REQUIRED_FEATURES,
};
use voxmarch_engine::time::FpsCounter;
use voxmarch_engine::volume::VoxelVolume;
use voxmarch_engine::window::{Runtime, RuntimeConfig};

use crate::controls::{auto_orbit_position, ControlTargets, Controls, Toggles};
use crate::edit::VolumeEditor;
use crate::scene::SceneConfig;

// ── Viewer ────────────────────────────────────────────────────────────────

/// Top-level viewer builder.
///
/// Start from a [`SceneConfig`] preset, override what you need, then call
/// [`run`](Self::run):
///
/// ```rust,ignore
/// Viewer::new(SceneConfig::vox_model("castle.vox"))
///     .size(1280, 720)
///     .vsync(true)
///     .run()?;
/// ```
pub struct Viewer {
    config: SceneConfig,
    edit: Option<VolumeEdit>,
}

/// Per-frame volume edit: gets an editor over the volume and the seconds
/// since start.
pub type VolumeEdit = Box<dyn FnMut(&mut VolumeEditor<'_>, f32)>;

impl Viewer {
    pub fn new(config: SceneConfig) -> Self {
        Self { config, edit: None }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.config.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.config.size = (width, height);
        self
    }

    pub fn lighting(mut self, lighting: LightingParams) -> Self {
        self.config.lighting = lighting;
        self
    }

    pub fn vsync(mut self, on: bool) -> Self {
        self.config.vsync = on;
        self
    }

    pub fn auto_orbit(mut self, on: bool) -> Self {
        self.config.auto_orbit = on;
        self
    }

    /// Runs `edit` before every frame. Changed volumes are re-uploaded and
    /// restart accumulation.
    pub fn edit_volume(mut self, edit: impl FnMut(&mut VolumeEditor<'_>, f32) + 'static) -> Self {
        self.edit = Some(Box::new(edit));
        self
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Loads the scene, opens the window and renders until it is closed.
    ///
    /// Model, noise, window, device and shader failures are all fatal and
    /// returned here.
    pub fn run(self) -> Result<()> {
        let volume = self.config.model.load().context("failed to load scene model")?;
        let noise = NoiseLayers::load(&self.config.noise).context("failed to load noise layers")?;

        let runtime = RuntimeConfig {
            title: self.config.title.clone(),
            initial_size: LogicalSize::new(self.config.size.0 as f64, self.config.size.1 as f64),
        };
        let gpu_init = gpu_init_for(&self.config);

        let mut state = ViewerState::new(self.config, volume, noise);
        state.edit = self.edit;
        Runtime::run(runtime, gpu_init, state)
    }
}

fn gpu_init_for(config: &SceneConfig) -> GpuInit {
    GpuInit {
        present_mode: if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        },
        required_features: REQUIRED_FEATURES,
        read_write_storage: Some(OUTPUT_FORMAT),
        ..GpuInit::default()
    }
}

/// Window title with the live frame rate and sample count.
pub fn hud_title(title: &str, fps: f32, samples: u32) -> String {
    format!("{title} | {fps:.0} fps | {samples} spp")
}

// ── ViewerState ───────────────────────────────────────────────────────────

struct GpuResources {
    dispatcher: TraceDispatcher,
    presenter: Presenter,
}

struct AutoOrbit {
    focus: Vec3,
    radius: f32,
}

/// Internal state that implements `voxmarch_engine::core::App`.
struct ViewerState {
    title: String,

    volume: VoxelVolume,
    noise: NoiseLayers,

    camera: Camera,
    lighting: LightingParams,
    accumulator: FrameAccumulator,
    toggles: Toggles,
    controls: Controls,
    orbit: AutoOrbit,
    fps: FpsCounter,
    edit: Option<VolumeEdit>,

    gpu: Option<GpuResources>,
}

impl ViewerState {
    fn new(config: SceneConfig, volume: VoxelVolume, noise: NoiseLayers) -> Self {
        let (position, focus) = config.camera.resolve(volume.size());
        let camera = Camera::new(position, focus, config.size.0, config.size.1);
        let orbit = AutoOrbit {
            focus,
            radius: camera.distance(),
        };

        Self {
            title: config.title,
            volume,
            noise,
            camera,
            lighting: config.lighting,
            accumulator: FrameAccumulator::new(),
            toggles: Toggles {
                accumulate: config.accumulate,
                auto_orbit: config.auto_orbit,
            },
            controls: Controls::new(),
            orbit,
            fps: FpsCounter::new(),
            edit: None,
            gpu: None,
        }
    }

    /// Matches the accumulation image and projection to the surface.
    fn sync_viewport(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let Some(current) = self.gpu.as_ref().map(|g| g.dispatcher.output_size()) else {
            return;
        };
        if self.apply_viewport(current, width, height) {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.dispatcher.ensure_output(device, width, height);
            }
        }
    }

    /// Updates the projection and restarts accumulation when the surface no
    /// longer matches the accumulation image of extent `current`. Returns
    /// `true` when the image must be reallocated.
    fn apply_viewport(&mut self, current: Option<(u32, u32)>, width: u32, height: u32) -> bool {
        if !output_needs_realloc(current, width, height) {
            return false;
        }
        self.camera.set_viewport(width, height);
        log::debug!("accumulation reset: viewport {width}x{height}");
        self.accumulator.invalidate();
        true
    }

    /// Settles this frame's counters. Returns the sample count the trace
    /// blends with (weight `1 / n`).
    fn advance_accumulation(&mut self) -> u32 {
        self.accumulator.tick();
        self.accumulator.sample_count()
    }

    /// Runs the edit hook. Returns `true` when the volume needs re-uploading.
    fn run_edit(&mut self, elapsed: f32) -> bool {
        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        let mut editor = VolumeEditor::new(&mut self.volume);
        edit(&mut editor, elapsed);
        if !editor.changed() {
            return false;
        }
        log::debug!("accumulation reset: volume edited");
        self.accumulator.invalidate();
        true
    }
}

impl EngineApp for ViewerState {
    fn on_init(&mut self, gpu: &Gpu<'_>, window: &WindowCtx<'_>) -> Result<()> {
        let dispatcher = TraceDispatcher::new(gpu.device(), gpu.queue(), &self.volume, &self.noise)
            .context("failed to build trace pipeline")?;
        let presenter = Presenter::new(gpu.device(), gpu.surface_format())
            .context("failed to build present pipeline")?;
        self.gpu = Some(GpuResources { dispatcher, presenter });

        let (w, h) = window.physical_size();
        self.sync_viewport(gpu.device(), w, h);

        log::info!(
            "viewer ready ({:?}, {} bounces, shadows {})",
            gpu.present_mode(),
            self.lighting.num_ray_bounces,
            if self.lighting.enable_shadows { "on" } else { "off" }
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }
        self.sync_viewport(ctx.gpu.device(), size.width, size.height);

        // ── Input ─────────────────────────────────────────────────────────
        let outcome = self.controls.apply(
            ctx.input,
            ctx.input_frame,
            (size.width, size.height),
            ControlTargets {
                camera: &mut self.camera,
                lighting: &mut self.lighting,
                toggles: &mut self.toggles,
                accumulator: &mut self.accumulator,
            },
        );
        if outcome.exit {
            return AppControl::Exit;
        }

        if self.toggles.auto_orbit {
            let at = auto_orbit_position(self.orbit.focus, self.orbit.radius, ctx.time.elapsed);
            self.camera.set_position(at);
            self.accumulator.invalidate();
        }

        let edited = self.run_edit(ctx.time.elapsed);

        // ── Trace + present ───────────────────────────────────────────────
        let Some(gpu) = self.gpu.as_mut() else {
            return AppControl::Continue;
        };
        if edited && !gpu.dispatcher.update_volume(ctx.gpu.queue(), &self.volume) {
            ctx.runtime.fail(anyhow!(
                "edited volume extent {} no longer matches the uploaded {}",
                self.volume.size(),
                gpu.dispatcher.map_size()
            ));
            return AppControl::Exit;
        }

        // Resets requested above take effect here, before the trace reads the counters.
        // Same as `advance_accumulation`, borrowing only the accumulator field.
        self.accumulator.tick();
        let (camera, accumulator, lighting) = (&self.camera, &self.accumulator, &self.lighting);

        let control = ctx.render(|rctx, target| {
            let traced = gpu
                .dispatcher
                .dispatch(rctx.queue, &mut *target.encoder, camera, accumulator, lighting);
            if let Some(image) = traced {
                gpu.presenter.present(rctx.device, target, image);
            }
        });

        // ── HUD ───────────────────────────────────────────────────────────
        if let Some(fps) = self.fps.frame(ctx.time.now) {
            let samples = self.accumulator.sample_count();
            log::debug!("{fps:.1} fps, {samples} spp");
            ctx.window.set_title(&hud_title(&self.title, fps, samples));
        }

        control
    }
}
