pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod drag;
pub mod easing;
pub mod engine;
pub mod input;
pub mod mesh;
pub mod model;
pub mod scene;
pub mod stages;
pub mod time;
pub mod tour;
pub mod transition;

pub use assets::{AssetCache, AssetFetcher, GltfFetcher, MemoryFetcher, PreloadSummary};
pub use config::{EngineConfig, EngineConfigOverrides};
pub use engine::PathEngine;
pub use input::{NavigationCommand, PointerEvent};
pub use model::{Model, ModelHandle};
pub use scene::{SceneContainer, SceneGraph, SceneNode};
pub use stages::{StageDefinition, StellarPath};
pub use transition::Progress;
