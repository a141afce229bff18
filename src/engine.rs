use crate::assets::{self, AssetCache, AssetFetcher, PreloadSummary};
use crate::camera::{Camera3D, CameraMotion};
use crate::config::EngineConfig;
use crate::drag::DragInertia;
use crate::input::{NavigationCommand, PointerEvent};
use crate::model::ModelHandle;
use crate::scene::{Lighting, SceneContainer, SceneGraph, SceneNode};
use crate::stages::{StageDefinition, StellarPath};
use crate::transition::{Progress, SwapContext, Transition, TransitionStatus};
use glam::{Vec2, Vec3};

const BACKGROUND_DRIFT: Vec3 = Vec3::new(0.000_04, 0.000_1, 0.0);

/// Owns everything the stage tour mutates. UI code calls the navigation methods, the frame
/// loop calls [`PathEngine::tick`], and the renderer reads the scene and handles back.
pub struct PathEngine<S: SceneContainer = SceneGraph> {
    config: EngineConfig,
    scene: S,
    camera: Camera3D,
    camera_motion: CameraMotion,
    lighting: Lighting,
    cache: AssetCache,
    active_path: StellarPath,
    current_index: usize,
    current_model: Option<ModelHandle>,
    background: Option<ModelHandle>,
    drag: DragInertia,
    transition: Option<Transition>,
    stellar_mass: f32,
}

impl<S: SceneContainer> PathEngine<S> {
    pub fn new(mut scene: S, config: EngineConfig) -> Self {
        let camera_cfg = &config.camera;
        let camera = Camera3D::looking_at_origin(
            camera_cfg.initial_distance,
            camera_cfg.fov_degrees.to_radians(),
            camera_cfg.near,
            camera_cfg.far,
        );
        let light_cfg = &config.lighting;
        let lighting = Lighting::new(
            Vec3::from_array(light_cfg.point_position),
            light_cfg.point_range,
            light_cfg.color,
            light_cfg.point_intensity,
            light_cfg.ambient_intensity,
        );
        scene.add(SceneNode::Light(lighting.ambient.clone()));
        scene.add(SceneNode::Light(lighting.point.clone()));

        Self {
            camera,
            camera_motion: CameraMotion::new(config.camera.motion_secs),
            lighting,
            cache: AssetCache::new(),
            active_path: StellarPath::LowMass,
            current_index: 0,
            current_model: None,
            background: None,
            drag: DragInertia::new(config.drag.clone()),
            transition: None,
            stellar_mass: 1.0,
            scene,
            config,
        }
    }

    /// Activates the branch for `mass` and rewinds to its first stage. The displayed model is
    /// detached; call [`PathEngine::transition_to`] to show stage 0.
    pub fn select_path(&mut self, mass: f32) {
        if self.is_animating() {
            log::warn!("[engine] path selection ignored while a transition is running");
            return;
        }
        self.active_path = StellarPath::for_mass(mass);
        self.stellar_mass = mass;
        self.current_index = 0;
        if let Some(previous) = self.current_model.take() {
            self.scene.remove(&SceneNode::Model(previous.clone()));
            previous.borrow_mut().set_shown(false);
        }
        self.drag.stop();
        log::info!("[engine] mass {mass} M☉ selects the {} path", self.active_path.label());
    }

    pub async fn preload_all<F>(&mut self, fetcher: &dyn AssetFetcher, on_each_settled: F) -> PreloadSummary
    where
        F: FnMut(usize, usize),
    {
        self.cache.preload_all(fetcher, on_each_settled).await
    }

    /// Loads the backdrop (or its starfield fallback) and attaches it to the scene.
    pub async fn load_background(&mut self, fetcher: &dyn AssetFetcher) {
        let acquisition = assets::load_background(fetcher, &self.config.assets).await;
        if let Some(previous) = self.background.take() {
            self.scene.remove(&SceneNode::Model(previous));
        }
        let background = ModelHandle::new(acquisition.into_model());
        self.scene.add(SceneNode::Model(background.clone()));
        self.background = Some(background);
    }

    /// Starts the animated swap to `index` of the active path. Returns whether a transition began;
    /// requests while animating, out of range, for the stage already shown, or for an uncached
    /// stage are dropped.
    pub fn transition_to<F>(&mut self, index: usize, on_progress: F) -> bool
    where
        F: FnOnce(Progress, &'static StageDefinition) + 'static,
    {
        if self.is_animating() {
            log::debug!("[engine] transition to {index} ignored, animation in progress");
            return false;
        }
        let stages = self.active_path.stages();
        let Some(stage) = stages.get(index) else {
            log::warn!("[engine] stage {index} is outside the {} path", self.active_path.label());
            return false;
        };
        if index == self.current_index && self.current_model.is_some() {
            return false;
        }
        let Some(incoming) = self.cache.model(self.active_path, index) else {
            log::warn!("[engine] stage {index} ('{}') is not in the active cache", stage.id);
            return false;
        };

        self.drag.stop();
        self.transition = Some(Transition::new(
            self.current_model.clone(),
            incoming,
            stage,
            index,
            &self.config.transition,
            Some(Box::new(on_progress)),
        ));
        true
    }

    pub fn next<F>(&mut self, on_progress: F) -> bool
    where
        F: FnOnce(Progress, &'static StageDefinition) + 'static,
    {
        let last = self.active_path.stages().len().saturating_sub(1);
        let index = (self.current_index + 1).min(last);
        if index == self.current_index {
            return false;
        }
        self.transition_to(index, on_progress)
    }

    pub fn prev<F>(&mut self, on_progress: F) -> bool
    where
        F: FnOnce(Progress, &'static StageDefinition) + 'static,
    {
        let index = self.current_index.saturating_sub(1);
        if index == self.current_index {
            return false;
        }
        self.transition_to(index, on_progress)
    }

    pub fn navigate<F>(&mut self, command: NavigationCommand, on_progress: F) -> bool
    where
        F: FnOnce(Progress, &'static StageDefinition) + 'static,
    {
        match command {
            NavigationCommand::Next => self.next(on_progress),
            NavigationCommand::Prev => self.prev(on_progress),
        }
    }

    /// Advances every time-driven controller by one frame. Call once per rendered frame.
    pub fn tick(&mut self, delta_seconds: f32) {
        let dt = delta_seconds.max(0.0);

        if let Some(background) = &self.background {
            background.rotate_by(BACKGROUND_DRIFT);
        }

        if self.transition.is_none() && !self.drag.is_active() {
            self.drag.step(self.current_model.as_ref());
        }

        if let Some(distance) = self.camera_motion.advance(dt) {
            self.camera.set_distance(distance);
        }

        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let mut ctx = SwapContext {
            scene: &mut self.scene,
            lighting: &self.lighting,
            camera: &self.camera,
            camera_motion: &mut self.camera_motion,
            current_model: &mut self.current_model,
            current_index: &mut self.current_index,
        };
        if let TransitionStatus::Finished(completion) = transition.advance(dt, &mut ctx) {
            self.transition = None;
            log::info!("[engine] stage ready: {}", completion.stage.label);
            completion.notify();
        }
    }

    /// Input-layer gate: drags only start while no transition is running.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.is_animating() {
            return false;
        }
        self.drag.pointer_down(x, y);
        true
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.is_animating() {
            self.drag.track(x, y);
            return;
        }
        self.drag.pointer_move(x, y, self.current_model.as_ref());
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => {
                self.pointer_down(x, y);
            }
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.active_path.stages().len()
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn active_path(&self) -> StellarPath {
        self.active_path
    }

    pub fn active_stages(&self) -> &'static [StageDefinition] {
        self.active_path.stages()
    }

    pub fn current_stage(&self) -> &'static StageDefinition {
        &self.active_path.stages()[self.current_index]
    }

    pub fn current_model(&self) -> Option<&ModelHandle> {
        self.current_model.as_ref()
    }

    pub fn background(&self) -> Option<&ModelHandle> {
        self.background.as_ref()
    }

    pub fn stellar_mass(&self) -> f32 {
        self.stellar_mass
    }

    pub fn drag_velocity(&self) -> Vec2 {
        self.drag.velocity()
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
