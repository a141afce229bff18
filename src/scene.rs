use crate::model::{rgb, ModelHandle};
use crate::stages::StageDefinition;
use glam::Vec3;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Point { position: Vec3, range: f32 },
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct LightHandle(Rc<RefCell<Light>>);

impl LightHandle {
    pub fn new(light: Light) -> Self {
        Self(Rc::new(RefCell::new(light)))
    }

    pub fn get(&self) -> Light {
        *self.0.borrow()
    }

    pub fn borrow(&self) -> Ref<'_, Light> {
        self.0.borrow()
    }

    pub fn set_color(&self, color: u32) {
        self.0.borrow_mut().color = rgb(color);
    }

    pub fn set_intensity(&self, intensity: f32) {
        self.0.borrow_mut().intensity = intensity;
    }

    pub fn ptr_eq(&self, other: &LightHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// The point + ambient pair every stage re-tints.
#[derive(Debug, Clone)]
pub struct Lighting {
    pub point: LightHandle,
    pub ambient: LightHandle,
}

impl Lighting {
    pub fn new(point_position: Vec3, point_range: f32, color: u32, point_intensity: f32, ambient_intensity: f32) -> Self {
        Self {
            point: LightHandle::new(Light {
                kind: LightKind::Point { position: point_position, range: point_range },
                color: rgb(color),
                intensity: point_intensity,
            }),
            ambient: LightHandle::new(Light { kind: LightKind::Ambient, color: rgb(color), intensity: ambient_intensity }),
        }
    }

    pub fn apply_stage(&self, stage: &StageDefinition) {
        self.point.set_color(stage.light_color);
        self.point.set_intensity(stage.light_intensity);
        self.ambient.set_intensity(stage.ambient_intensity);
    }
}

#[derive(Debug, Clone)]
pub enum SceneNode {
    Model(ModelHandle),
    Light(LightHandle),
}

impl SceneNode {
    pub fn same_node(&self, other: &SceneNode) -> bool {
        match (self, other) {
            (SceneNode::Model(a), SceneNode::Model(b)) => a.ptr_eq(b),
            (SceneNode::Light(a), SceneNode::Light(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Whatever owns the renderable scene graph. The engine only ever attaches and detaches nodes;
/// transforms and light values are read back from the shared handles.
pub trait SceneContainer {
    fn add(&mut self, node: SceneNode);
    fn remove(&mut self, node: &SceneNode);
}

/// Flat in-memory scene, enough for headless runs and for the renderer to walk.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelHandle> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Model(model) => Some(model),
            SceneNode::Light(_) => None,
        })
    }

    pub fn lights(&self) -> impl Iterator<Item = &LightHandle> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            SceneNode::Model(_) => None,
        })
    }

    pub fn model_count(&self) -> usize {
        self.models().count()
    }

    pub fn contains_model(&self, model: &ModelHandle) -> bool {
        self.models().any(|candidate| candidate.ptr_eq(model))
    }
}

impl SceneContainer for SceneGraph {
    fn add(&mut self, node: SceneNode) {
        if self.nodes.iter().any(|existing| existing.same_node(&node)) {
            return;
        }
        self.nodes.push(node);
    }

    fn remove(&mut self, node: &SceneNode) {
        self.nodes.retain(|existing| !existing.same_node(node));
    }
}
