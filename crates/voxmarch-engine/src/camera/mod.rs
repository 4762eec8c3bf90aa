//! Orbit camera and the view/projection math the ray-marcher inverts.
//!
//! All derived matrices are recomputed on every mutation, so a `Camera`
//! never exposes a stale inverse.

mod orbit;

use glam::{Mat4, Vec3};

/// Vertical field of view, in radians.
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Alignment between view direction and up past which vertical orbiting stops.
pub const POLE_COS_LIMIT: f32 = 0.99;

/// Right-handed view transform.
#[inline]
pub fn look_at(position: Vec3, focus: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(position, focus, up)
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
#[inline]
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y, aspect, near, far)
}

/// Matrices derived from a camera state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub inv_view: Mat4,
    /// `inv_view` with its translation zeroed; rotates ray directions only.
    pub inv_centered_view: Mat4,
    pub projection: Mat4,
    pub inv_projection: Mat4,
}

impl CameraMatrices {
    fn compute(position: Vec3, focus: Vec3, up: Vec3, aspect: f32) -> Self {
        let view = look_at(position, focus, up);
        let inv_view = view.inverse();

        let mut inv_centered_view = inv_view;
        inv_centered_view.w_axis.x = 0.0;
        inv_centered_view.w_axis.y = 0.0;
        inv_centered_view.w_axis.z = 0.0;

        let projection = perspective(FOV_Y, aspect, Z_NEAR, Z_FAR);
        Self {
            view,
            inv_view,
            inv_centered_view,
            projection,
            inv_projection: projection.inverse(),
        }
    }
}

/// Camera orbiting a focus point.
///
/// Invariants: `position != focus` and `up` is never parallel to the view
/// direction (enforced by the orbit pole guard).
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    focus: Vec3,
    up: Vec3,
    aspect: f32,
    matrices: CameraMatrices,
}

impl Camera {
    /// Creates a Y-up camera for a `width × height` viewport.
    pub fn new(position: Vec3, focus: Vec3, width: u32, height: u32) -> Self {
        Self::with_up(position, focus, Vec3::Y, aspect_of(width, height))
    }

    pub fn with_up(position: Vec3, focus: Vec3, up: Vec3, aspect: f32) -> Self {
        debug_assert!(position != focus, "camera position coincides with focus");
        let up = up.normalize();
        Self {
            position,
            focus,
            up,
            aspect,
            matrices: CameraMatrices::compute(position, focus, up, aspect),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn matrices(&self) -> &CameraMatrices {
        &self.matrices
    }

    /// Unit vector from the eye toward the focus point.
    #[inline]
    pub fn view_dir(&self) -> Vec3 {
        (self.focus - self.position).normalize()
    }

    /// Camera right axis: first row of the view matrix.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.matrices.view.row(0).truncate()
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.focus)
    }

    /// Moves the eye, keeping the focus point.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh();
    }

    /// Updates the projection aspect ratio after a viewport resize.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.matrices = CameraMatrices::compute(self.position, self.focus, self.up, self.aspect);
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn start() -> Camera {
        Camera::new(Vec3::new(0.0, 16.0, 40.0), Vec3::splat(16.0), 1920, 1010)
    }

    // ── inverses ──────────────────────────────────────────────────────────

    #[test]
    fn inverses_compose_to_identity() {
        let cams = [
            start(),
            Camera::new(Vec3::new(3.0, -2.0, 1.0), Vec3::ZERO, 800, 600),
            Camera::new(Vec3::new(40.0, 30.0, -5.0), Vec3::new(1.0, 2.0, 3.0), 640, 1280),
        ];
        for cam in &cams {
            let m = cam.matrices();
            assert!((m.inv_view * m.view).abs_diff_eq(Mat4::IDENTITY, EPS));
            assert!((m.inv_projection * m.projection).abs_diff_eq(Mat4::IDENTITY, EPS));
        }
    }

    #[test]
    fn centered_inverse_drops_translation_only() {
        let cam = start();
        let m = cam.matrices();
        assert_eq!(m.inv_centered_view.x_axis, m.inv_view.x_axis);
        assert_eq!(m.inv_centered_view.y_axis, m.inv_view.y_axis);
        assert_eq!(m.inv_centered_view.z_axis, m.inv_view.z_axis);
        assert_eq!(m.inv_centered_view.w_axis.truncate(), Vec3::ZERO);
        assert_eq!(m.inv_centered_view.w_axis.w, m.inv_view.w_axis.w);
    }

    #[test]
    fn inverse_view_translation_is_eye_position() {
        let cam = start();
        let eye = cam.matrices().inv_view.w_axis.truncate();
        assert!(eye.abs_diff_eq(cam.position(), EPS));
    }

    #[test]
    fn right_axis_is_perpendicular_to_view_and_up() {
        let cam = start();
        assert!(cam.right().dot(cam.view_dir()).abs() < EPS);
        assert!(cam.right().dot(Vec3::Y).abs() < EPS);
    }

    // ── mutation ──────────────────────────────────────────────────────────

    #[test]
    fn set_position_recomputes_matrices() {
        let mut cam = start();
        let before = *cam.matrices();
        cam.set_position(Vec3::new(10.0, 20.0, 40.0));
        assert_ne!(before.inv_view, cam.matrices().inv_view);
        let eye = cam.matrices().inv_view.w_axis.truncate();
        assert!(eye.abs_diff_eq(Vec3::new(10.0, 20.0, 40.0), EPS));
    }

    #[test]
    fn viewport_change_updates_projection_only() {
        let mut cam = start();
        let before = *cam.matrices();
        cam.set_viewport(800, 800);
        assert!((cam.aspect() - 1.0).abs() < EPS);
        assert_eq!(before.view, cam.matrices().view);
        assert_ne!(before.projection, cam.matrices().projection);
    }

    #[test]
    fn zero_height_viewport_does_not_divide_by_zero() {
        let cam = Camera::new(Vec3::Z, Vec3::ZERO, 800, 0);
        assert!(cam.aspect().is_finite());
    }
}
