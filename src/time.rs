use std::time::Duration;

/// Fixed-step frame source for [`crate::PathEngine::tick`] in headless runs and tests.
pub struct FrameClock {
    step: Duration,
    elapsed: Duration,
    frames: u64,
    pub delta: Duration,
}

impl FrameClock {
    /// Non-positive or non-finite rates fall back to 60 Hz.
    pub fn fixed(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self { step: Duration::from_secs_f32(1.0 / fps), elapsed: Duration::ZERO, frames: 0, delta: Duration::ZERO }
    }

    pub fn tick(&mut self) -> f32 {
        self.delta = self.step;
        self.elapsed += self.delta;
        self.frames += 1;
        self.delta_seconds()
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
