//! Frame-driven stage swap.
//!
//! A transition runs in two phases. During spin-up the outgoing model accelerates
//! (quadratic ease-in) to `max_angle` of extra yaw. When spin-up completes the scene swap
//! happens exactly once: the outgoing model is detached, the incoming one inherits its
//! rotation and is attached, and lights and camera are retargeted. Spin-down then lets
//! the incoming model coast (quadratic ease-out) before the completion callback fires.
//!
//! The state is advanced only by [`Transition::advance`], so a single external clock
//! drives everything and there is never more than one model in the scene after a tick.

use crate::camera::{Camera3D, CameraMotion};
use crate::config::TransitionConfig;
use crate::easing::{ease_in_quad, ease_out_quad, phase_progress};
use crate::model::ModelHandle;
use crate::scene::{Lighting, SceneContainer, SceneNode};
use crate::stages::StageDefinition;
use glam::Vec3;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SpinUp,
    SpinDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Ready,
}

pub type ProgressCallback = Box<dyn FnOnce(Progress, &'static StageDefinition)>;

/// Engine state a transition needs to touch at the swap point.
pub struct SwapContext<'a> {
    pub scene: &'a mut dyn SceneContainer,
    pub lighting: &'a Lighting,
    pub camera: &'a Camera3D,
    pub camera_motion: &'a mut CameraMotion,
    pub current_model: &'a mut Option<ModelHandle>,
    pub current_index: &'a mut usize,
}

pub enum TransitionStatus {
    Running,
    Finished(Completion),
}

/// Handed back when spin-down ends; the owner drops the transition first, then notifies.
pub struct Completion {
    pub stage: &'static StageDefinition,
    pub index: usize,
    on_progress: Option<ProgressCallback>,
}

impl Completion {
    pub fn notify(self) {
        if let Some(callback) = self.on_progress {
            callback(Progress::Ready, self.stage);
        }
    }
}

pub struct Transition {
    outgoing: Option<ModelHandle>,
    incoming: ModelHandle,
    stage: &'static StageDefinition,
    index: usize,
    phase: Phase,
    elapsed: f32,
    eased_prev: f32,
    swapped: bool,
    spin_up_secs: f32,
    spin_down_secs: f32,
    max_angle: f32,
    on_progress: Option<ProgressCallback>,
}

impl Transition {
    pub fn new(
        outgoing: Option<ModelHandle>,
        incoming: ModelHandle,
        stage: &'static StageDefinition,
        index: usize,
        config: &TransitionConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Self {
        // first display has nothing to spin away
        let spin_up_secs = if outgoing.is_some() { config.spin_up_secs.max(0.0) } else { 0.0 };
        Self {
            outgoing,
            incoming,
            stage,
            index,
            phase: Phase::SpinUp,
            elapsed: 0.0,
            eased_prev: 0.0,
            swapped: false,
            spin_up_secs,
            spin_down_secs: config.spin_down_secs.max(0.0),
            max_angle: config.max_spin_angle,
            on_progress,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_swapped(&self) -> bool {
        self.swapped
    }

    pub fn advance(&mut self, dt: f32, ctx: &mut SwapContext<'_>) -> TransitionStatus {
        self.elapsed += dt.max(0.0);

        if self.phase == Phase::SpinUp {
            let t = phase_progress(self.elapsed, self.spin_up_secs);
            let eased = ease_in_quad(t);
            if let Some(outgoing) = &self.outgoing {
                outgoing.rotate_by(Vec3::Y * (eased - self.eased_prev) * self.max_angle);
            }
            self.eased_prev = eased;
            if t < 1.0 {
                return TransitionStatus::Running;
            }
            self.swap(ctx);
            self.phase = Phase::SpinDown;
            self.elapsed = (self.elapsed - self.spin_up_secs).max(0.0);
            self.eased_prev = 0.0;
        }

        let t = phase_progress(self.elapsed, self.spin_down_secs);
        let eased = ease_out_quad(t);
        self.incoming.rotate_by(Vec3::Y * (eased - self.eased_prev) * self.max_angle);
        self.eased_prev = eased;
        if t < 1.0 {
            return TransitionStatus::Running;
        }
        TransitionStatus::Finished(Completion { stage: self.stage, index: self.index, on_progress: self.on_progress.take() })
    }

    fn swap(&mut self, ctx: &mut SwapContext<'_>) {
        if self.swapped {
            return;
        }
        self.swapped = true;

        let carried = self.outgoing.as_ref().map(ModelHandle::rotation).unwrap_or(Vec3::ZERO);
        if let Some(outgoing) = &self.outgoing {
            ctx.scene.remove(&SceneNode::Model(outgoing.clone()));
            outgoing.borrow_mut().set_shown(false);
        }
        {
            let mut incoming = self.incoming.borrow_mut();
            incoming.transform.rotation = carried;
            incoming.set_shown(true);
        }
        ctx.scene.add(SceneNode::Model(self.incoming.clone()));

        *ctx.current_model = Some(self.incoming.clone());
        *ctx.current_index = self.index;

        ctx.lighting.apply_stage(self.stage);
        ctx.camera_motion.begin(ctx.camera.distance(), self.stage.camera_distance);
        log::debug!("[transition] swapped to '{}' (index {})", self.stage.id, self.index);
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("stage", &self.stage.id)
            .field("index", &self.index)
            .field("phase", &self.phase)
            .field("elapsed", &self.elapsed)
            .field("swapped", &self.swapped)
            .finish()
    }
}
