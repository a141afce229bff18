use crate::easing::{ease_in_out_quad, phase_progress};
use glam::{Mat4, Vec3};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective camera looking at the stage subject.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    /// Camera on the +Z axis looking back at the origin.
    pub fn looking_at_origin(distance: f32, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self::new(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, fov_y_radians, near, far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Moves the camera along its current viewing axis so it sits `distance` from the target.
    pub fn set_distance(&mut self, distance: f32) {
        let axis = (self.position - self.target).try_normalize().unwrap_or(Vec3::Z);
        self.position = self.target + axis * distance.max(0.0);
    }
}

/// Eases camera distance toward a target. A new motion replaces any motion in progress.
#[derive(Debug, Clone)]
pub struct CameraMotion {
    duration: f32,
    from: f32,
    to: f32,
    elapsed: f32,
    active: bool,
}

impl CameraMotion {
    pub fn new(duration: f32) -> Self {
        Self { duration: duration.max(0.0), from: 0.0, to: 0.0, elapsed: 0.0, active: false }
    }

    pub fn begin(&mut self, from: f32, to: f32) {
        self.from = from;
        self.to = to;
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> Option<f32> {
        self.active.then_some(self.to)
    }

    /// Advances the motion and returns the distance to apply this frame, if one is running.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.active {
            return None;
        }
        self.elapsed += dt.max(0.0);
        let t = phase_progress(self.elapsed, self.duration);
        if t >= 1.0 {
            self.active = false;
            return Some(self.to);
        }
        Some(self.from + (self.to - self.from) * ease_in_out_quad(t))
    }
}
