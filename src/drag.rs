use crate::config::DragConfig;
use crate::model::ModelHandle;
use glam::{Vec2, Vec3};

/// Pointer drag that leaves the model spinning after release.
///
/// Velocity is stored per frame (radians per tick), matching how pointer deltas arrive.
/// Callers decide when dragging is allowed; this type only tracks the gesture.
#[derive(Debug, Clone)]
pub struct DragInertia {
    config: DragConfig,
    active: bool,
    last: Vec2,
    velocity: Vec2,
}

impl DragInertia {
    pub fn new(config: DragConfig) -> Self {
        Self { config, active: false, last: Vec2::ZERO, velocity: Vec2::ZERO }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `x` is pitch (rotation about X), `y` is yaw.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.active = true;
        self.last = Vec2::new(x, y);
        self.velocity = Vec2::ZERO;
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, model: Option<&ModelHandle>) {
        if !self.active {
            return;
        }
        let position = Vec2::new(x, y);
        let Some(model) = model else {
            self.last = position;
            return;
        };
        let delta = position - self.last;
        // vertical motion pitches, horizontal motion yaws
        self.velocity = Vec2::new(delta.y, delta.x) * self.config.sensitivity;
        model.rotate_by(Vec3::new(self.velocity.x, self.velocity.y, 0.0));
        self.last = position;
    }

    /// Follows the pointer without rotating anything, so a later move measures from here.
    pub fn track(&mut self, x: f32, y: f32) {
        if self.active {
            self.last = Vec2::new(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.active = false;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// One idle frame of inertia: apply the stored velocity, then decay it.
    pub fn step(&mut self, model: Option<&ModelHandle>) {
        if self.active {
            return;
        }
        let Some(model) = model else {
            return;
        };
        if self.velocity == Vec2::ZERO {
            return;
        }
        model.rotate_by(Vec3::new(self.velocity.x, self.velocity.y, 0.0));
        self.velocity *= self.config.decay;
        let epsilon = self.config.rest_epsilon;
        if self.velocity.x.abs() < epsilon {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < epsilon {
            self.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn model() -> ModelHandle {
        ModelHandle::new(Model::placeholder_sphere("subject", 0xffffff))
    }

    #[test]
    fn drag_applies_rotation_immediately() {
        let subject = model();
        let mut drag = DragInertia::new(DragConfig::default());
        drag.pointer_down(100.0, 100.0);
        drag.pointer_move(120.0, 90.0, Some(&subject));
        let expected = Vec2::new(-10.0, 20.0) * 0.005;
        assert!((drag.velocity() - expected).length() < 1e-6);
        let rotation = subject.rotation();
        assert!((rotation.x - expected.x).abs() < 1e-6);
        assert!((rotation.y - expected.y).abs() < 1e-6);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let subject = model();
        let mut drag = DragInertia::new(DragConfig::default());
        drag.pointer_move(50.0, 50.0, Some(&subject));
        assert_eq!(subject.rotation(), Vec3::ZERO);
        assert_eq!(drag.velocity(), Vec2::ZERO);
    }

    #[test]
    fn released_velocity_decays_and_snaps_to_rest() {
        let subject = model();
        let mut drag = DragInertia::new(DragConfig::default());
        drag.pointer_down(0.0, 0.0);
        drag.pointer_move(40.0, 0.0, Some(&subject));
        drag.pointer_up();

        let before = drag.velocity().y;
        drag.step(Some(&subject));
        assert!((drag.velocity().y - before * 0.92).abs() < 1e-7);

        for _ in 0..500 {
            drag.step(Some(&subject));
        }
        assert_eq!(drag.velocity(), Vec2::ZERO, "velocity should settle to exactly zero");
        let settled = subject.rotation();
        drag.step(Some(&subject));
        assert_eq!(subject.rotation(), settled);
    }

    #[test]
    fn tracked_moves_do_not_rotate_or_accumulate() {
        let subject = model();
        let mut drag = DragInertia::new(DragConfig::default());
        drag.pointer_down(0.0, 0.0);
        drag.track(200.0, 0.0);
        drag.pointer_move(300.0, 0.0, None);
        assert_eq!(drag.velocity(), Vec2::ZERO);
        drag.pointer_move(301.0, 0.0, Some(&subject));
        assert!((subject.rotation().y - 0.005).abs() < 1e-6);
    }

    #[test]
    fn pressing_again_clears_inertia() {
        let subject = model();
        let mut drag = DragInertia::new(DragConfig::default());
        drag.pointer_down(0.0, 0.0);
        drag.pointer_move(10.0, 10.0, Some(&subject));
        drag.pointer_up();
        drag.pointer_down(10.0, 10.0);
        assert_eq!(drag.velocity(), Vec2::ZERO);
        assert!(drag.is_active());
    }
}
