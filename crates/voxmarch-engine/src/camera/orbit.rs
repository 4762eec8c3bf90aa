use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use super::{Camera, POLE_COS_LIMIT};

impl Camera {
    /// Arc-ball orbit driven by a pointer delta in pixels.
    ///
    /// Horizontal motion turns the eye about the up axis by
    /// `dx · 2π / width`; vertical motion turns it about the camera right axis
    /// by `dy · π / height`. The vertical step is skipped when it would bring
    /// the view direction within `acos(0.99)` of the up axis.
    pub fn orbit(&mut self, dx: f32, dy: f32, width: u32, height: u32) {
        let angle_x = dx * TAU / width.max(1) as f32;
        let angle_y = dy * PI / height.max(1) as f32;

        if angle_x != 0.0 {
            let offset = Quat::from_axis_angle(self.up, angle_x) * (self.position - self.focus);
            self.position = self.focus + offset;
            self.refresh();
        }

        if angle_y != 0.0 {
            let offset = Quat::from_axis_angle(self.right(), angle_y) * (self.position - self.focus);
            let candidate = self.focus + offset;
            let dir = (self.focus - candidate).normalize();
            if dir.dot(self.up).abs() <= POLE_COS_LIMIT {
                self.position = candidate;
                self.refresh();
            }
        }
    }
}
