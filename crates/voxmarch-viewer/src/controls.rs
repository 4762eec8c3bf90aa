//! Input → camera / lighting edits.
//!
//! | Input | Effect |
//! |-------|--------|
//! | left drag | orbit the camera |
//! | `Space` | toggle accumulation |
//! | `R` | toggle auto-orbit |
//! | `H` | toggle shadows |
//! | `Up` / `Down` | ray bounces ±1 (0..=8) |
//! | `PageUp` / `PageDown` | max DDA depth ×2 / ÷2 (16..=4096) |
//! | `[` / `]` | shadow multiplier ±0.05 (0..=1) |
//! | `Left` / `Right` | rotate the sun ±5° about the up axis |
//! | `Escape` | exit |
//!
//! Every edit that changes the image restarts accumulation.

use glam::{Quat, Vec3};

use voxmarch_engine::accum::FrameAccumulator;
use voxmarch_engine::camera::Camera;
use voxmarch_engine::input::{InputFrame, InputState, Key, MouseButton};
use voxmarch_engine::render::LightingParams;

pub const MAX_BOUNCES: u32 = 8;
pub const MIN_DDA_DEPTH: u32 = 16;
pub const MAX_DDA_DEPTH: u32 = 4096;
pub const SHADOW_STEP: f32 = 0.05;
pub const SUN_STEP_DEGREES: f32 = 5.0;

/// Runtime switches the user can flip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Toggles {
    pub accumulate: bool,
    pub auto_orbit: bool,
}

/// What a control pass decided.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ControlOutcome {
    pub exit: bool,
    /// Why accumulation was restarted this frame, if it was.
    pub reset_reason: Option<&'static str>,
}

impl ControlOutcome {
    fn reset(&mut self, reason: &'static str) {
        self.reset_reason.get_or_insert(reason);
    }
}

/// Everything the controls are allowed to change.
pub struct ControlTargets<'a> {
    pub camera: &'a mut Camera,
    pub lighting: &'a mut LightingParams,
    pub toggles: &'a mut Toggles,
    pub accumulator: &'a mut FrameAccumulator,
}

/// Maps one frame of input onto the scene.
#[derive(Debug, Default)]
pub struct Controls;

impl Controls {
    pub fn new() -> Self {
        Self
    }

    /// Applies this frame's input. `viewport` is the surface size in physical pixels.
    pub fn apply(
        &mut self,
        input: &InputState,
        frame: &InputFrame,
        viewport: (u32, u32),
        targets: ControlTargets<'_>,
    ) -> ControlOutcome {
        let ControlTargets {
            camera,
            lighting,
            toggles,
            accumulator,
        } = targets;
        let mut out = ControlOutcome::default();

        if frame.key_pressed(Key::Escape) {
            out.exit = true;
            return out;
        }

        if frame.key_pressed(Key::Space) {
            toggles.accumulate = !toggles.accumulate;
            log::info!("accumulation {}", on_off(toggles.accumulate));
            out.reset("accumulation toggled");
        }

        if frame.key_pressed(Key::Char('r')) {
            toggles.auto_orbit = !toggles.auto_orbit;
            log::info!("auto-orbit {}", on_off(toggles.auto_orbit));
        }

        if frame.key_pressed(Key::Char('h')) {
            lighting.enable_shadows = !lighting.enable_shadows;
            out.reset("shadows toggled");
        }

        let bounces = step_bounces(lighting.num_ray_bounces, frame);
        if bounces != lighting.num_ray_bounces {
            lighting.num_ray_bounces = bounces;
            log::info!("ray bounces: {bounces}");
            out.reset("ray bounces changed");
        }

        let depth = step_depth(lighting.max_dda_depth, frame);
        if depth != lighting.max_dda_depth {
            lighting.max_dda_depth = depth;
            log::info!("max DDA depth: {depth}");
            out.reset("DDA depth changed");
        }

        let shadow = step_shadow(lighting.shadow_multiplier, frame);
        if shadow != lighting.shadow_multiplier {
            lighting.shadow_multiplier = shadow;
            out.reset("shadow multiplier changed");
        }

        let mut sun_turn = 0.0;
        if frame.key_pressed(Key::ArrowLeft) {
            sun_turn += SUN_STEP_DEGREES;
        }
        if frame.key_pressed(Key::ArrowRight) {
            sun_turn -= SUN_STEP_DEGREES;
        }
        if sun_turn != 0.0 {
            lighting.sun_dir = rotate_sun(lighting.sun_dir, sun_turn);
            out.reset("sun moved");
        }

        if !toggles.auto_orbit && input.button_down(MouseButton::Left) && frame.pointer_moved() {
            let (dx, dy) = frame.pointer_delta;
            camera.orbit(dx, dy, viewport.0, viewport.1);
            out.reset("camera moved");
        }

        if !toggles.accumulate {
            out.reset("accumulation disabled");
        }

        if let Some(reason) = out.reset_reason {
            log::trace!("accumulation reset: {reason}");
            accumulator.invalidate();
        }
        out
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn step_bounces(current: u32, frame: &InputFrame) -> u32 {
    let mut b = current;
    if frame.key_pressed(Key::ArrowUp) {
        b = (b + 1).min(MAX_BOUNCES);
    }
    if frame.key_pressed(Key::ArrowDown) {
        b = b.saturating_sub(1);
    }
    b
}

fn step_depth(current: u32, frame: &InputFrame) -> u32 {
    let mut d = current;
    if frame.key_pressed(Key::PageUp) {
        d = d.saturating_mul(2);
    }
    if frame.key_pressed(Key::PageDown) {
        d /= 2;
    }
    d.clamp(MIN_DDA_DEPTH, MAX_DDA_DEPTH)
}

fn step_shadow(current: f32, frame: &InputFrame) -> f32 {
    let mut s = current;
    if frame.key_pressed(Key::BracketRight) {
        s += SHADOW_STEP;
    }
    if frame.key_pressed(Key::BracketLeft) {
        s -= SHADOW_STEP;
    }
    s.clamp(0.0, 1.0)
}

/// Turns the sun direction about the world up axis.
pub fn rotate_sun(sun_dir: Vec3, degrees: f32) -> Vec3 {
    (Quat::from_rotation_y(degrees.to_radians()) * sun_dir).normalize_or(Vec3::Y)
}

/// Auto-orbit eye position `t` seconds in: circles the focus at `radius`
/// while bobbing ±14 units vertically.
pub fn auto_orbit_position(focus: Vec3, radius: f32, t: f32) -> Vec3 {
    let (s, c) = t.sin_cos();
    focus + Vec3::new(s * radius, s * 14.0, c * radius)
}
