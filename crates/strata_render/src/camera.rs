//! Perspective camera with yaw/pitch control
//!
//! The camera looks down its local -Z axis. Orientation is rebuilt from
//! Euler-like angles so pitch can be clamped without drifting.

use strata_math::{Frustum, Quat, Vec3};

/// Camera used to build the view frustum for visibility queries
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Full vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    pitch: f32,
    yaw: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Create a new camera at the default position
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            orientation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    /// Camera at `position` looking toward `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            ..Self::new()
        };
        let dir = (target - position).normalized();
        if dir.length_squared() > 0.0 {
            camera.yaw = (-dir.x).atan2(-dir.z);
            camera.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-1.5, 1.5);
            camera.rebuild_orientation();
        }
        camera
    }

    pub fn with_projection(mut self, fov_y: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_y;
        self.near = near;
        self.far = far;
        self
    }

    /// Mouse look (yaw and pitch)
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        // Clamp pitch to avoid flipping over the pole
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
        self.rebuild_orientation();
    }

    /// Move in the camera-local XZ plane (forward/backward, left/right)
    pub fn move_local_xz(&mut self, forward: f32, right: f32) {
        let fwd = self.forward().horizontal().normalized();
        let rgt = self.right().horizontal().normalized();
        self.position += fwd * forward + rgt * right;
    }

    pub fn move_y(&mut self, delta: f32) {
        self.position.y += delta;
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation.rotate(-Vec3::Z)
    }

    pub fn right(&self) -> Vec3 {
        self.orientation.rotate(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.orientation.rotate(Vec3::Y)
    }

    /// Distance of a point along the view direction
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.forward())
    }

    /// View frustum for a target with the given width / height ratio
    pub fn frustum(&self, aspect: f32) -> Frustum {
        Frustum::perspective(
            self.position,
            self.forward(),
            self.up(),
            self.fov_y,
            aspect,
            self.near,
            self.far,
        )
    }

    fn rebuild_orientation(&mut self) {
        // Pitch about local X first, then yaw about world up
        let r_yaw = Quat::from_yaw(self.yaw);
        let r_pitch = Quat::from_axis_angle(Vec3::X, self.pitch);
        self.orientation = r_yaw.compose(&r_pitch).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_camera_default_looks_down_neg_z() {
        let cam = Camera::new();
        assert_eq!(cam.position.z, 5.0);
        assert!(approx(cam.forward(), -Vec3::Z));
        assert!(approx(cam.right(), Vec3::X));
    }

    #[test]
    fn test_looking_at_faces_target() {
        let cam = Camera::looking_at(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(approx(cam.forward(), Vec3::X));
        assert!((cam.depth_of(Vec3::new(4.0, 1.0, 0.0)) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = Camera::new();
        cam.rotate(0.0, 10.0);
        assert!(cam.forward().y > 0.99);
        assert!(cam.forward().y < 1.0);
    }

    #[test]
    fn test_frustum_sees_in_front_only() {
        let cam = Camera::new();
        let frustum = cam.frustum(16.0 / 9.0);
        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
    }
}
