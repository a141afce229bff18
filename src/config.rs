use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/stellar_path.json";

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "TransitionConfig::default_spin_up_secs")]
    pub spin_up_secs: f32,
    #[serde(default = "TransitionConfig::default_spin_down_secs")]
    pub spin_down_secs: f32,
    /// Radians of extra yaw added over each spin phase.
    #[serde(default = "TransitionConfig::default_max_spin_angle")]
    pub max_spin_angle: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DragConfig {
    /// Radians of rotation per pixel of pointer travel.
    #[serde(default = "DragConfig::default_sensitivity")]
    pub sensitivity: f32,
    /// Per-frame velocity multiplier once the pointer is released.
    #[serde(default = "DragConfig::default_decay")]
    pub decay: f32,
    #[serde(default = "DragConfig::default_rest_epsilon")]
    pub rest_epsilon: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_initial_distance")]
    pub initial_distance: f32,
    #[serde(default = "CameraConfig::default_motion_secs")]
    pub motion_secs: f32,
    #[serde(default = "CameraConfig::default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightingConfig {
    #[serde(default = "LightingConfig::default_point_position")]
    pub point_position: [f32; 3],
    #[serde(default = "LightingConfig::default_point_range")]
    pub point_range: f32,
    #[serde(default = "LightingConfig::default_color")]
    pub color: u32,
    #[serde(default = "LightingConfig::default_point_intensity")]
    pub point_intensity: f32,
    #[serde(default = "LightingConfig::default_ambient_intensity")]
    pub ambient_intensity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Directory that stage locators and the background URI are resolved against.
    #[serde(default = "AssetConfig::default_root")]
    pub root: PathBuf,
    #[serde(default = "AssetConfig::default_background")]
    pub background: String,
    #[serde(default = "AssetConfig::default_background_scale")]
    pub background_scale: f32,
    #[serde(default = "AssetConfig::default_starfield_points")]
    pub starfield_points: usize,
    /// Edge length of the cube the fallback starfield is scattered in.
    #[serde(default = "AssetConfig::default_starfield_extent")]
    pub starfield_extent: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfigOverrides {
    pub assets_root: Option<PathBuf>,
    pub spin_up_secs: Option<f32>,
    pub spin_down_secs: Option<f32>,
}

impl TransitionConfig {
    const fn default_spin_up_secs() -> f32 {
        0.5
    }

    const fn default_spin_down_secs() -> f32 {
        0.6
    }

    const fn default_max_spin_angle() -> f32 {
        0.28
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            spin_up_secs: Self::default_spin_up_secs(),
            spin_down_secs: Self::default_spin_down_secs(),
            max_spin_angle: Self::default_max_spin_angle(),
        }
    }
}

impl DragConfig {
    const fn default_sensitivity() -> f32 {
        0.005
    }

    const fn default_decay() -> f32 {
        0.92
    }

    const fn default_rest_epsilon() -> f32 {
        1e-5
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: Self::default_sensitivity(),
            decay: Self::default_decay(),
            rest_epsilon: Self::default_rest_epsilon(),
        }
    }
}

impl CameraConfig {
    const fn default_initial_distance() -> f32 {
        8.0
    }

    const fn default_motion_secs() -> f32 {
        0.9
    }

    const fn default_fov_degrees() -> f32 {
        60.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        500.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_distance: Self::default_initial_distance(),
            motion_secs: Self::default_motion_secs(),
            fov_degrees: Self::default_fov_degrees(),
            near: Self::default_near(),
            far: Self::default_far(),
        }
    }
}

impl LightingConfig {
    const fn default_point_position() -> [f32; 3] {
        [5.0, 5.0, 5.0]
    }

    const fn default_point_range() -> f32 {
        200.0
    }

    const fn default_color() -> u32 {
        0xffffff
    }

    const fn default_point_intensity() -> f32 {
        1.5
    }

    const fn default_ambient_intensity() -> f32 {
        0.25
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            point_position: Self::default_point_position(),
            point_range: Self::default_point_range(),
            color: Self::default_color(),
            point_intensity: Self::default_point_intensity(),
            ambient_intensity: Self::default_ambient_intensity(),
        }
    }
}

impl AssetConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("assets")
    }

    fn default_background() -> String {
        "scene.gltf".to_string()
    }

    const fn default_background_scale() -> f32 {
        20.0
    }

    const fn default_starfield_points() -> usize {
        3_000
    }

    const fn default_starfield_extent() -> f32 {
        200.0
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            background: Self::default_background(),
            background_scale: Self::default_background_scale(),
            starfield_points: Self::default_starfield_points(),
            starfield_extent: Self::default_starfield_extent(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &EngineConfigOverrides) {
        if let Some(root) = &overrides.assets_root {
            self.assets.root = root.clone();
        }
        if let Some(secs) = overrides.spin_up_secs {
            self.transition.spin_up_secs = secs.max(0.0);
        }
        if let Some(secs) = overrides.spin_down_secs {
            self.transition.spin_down_secs = secs.max(0.0);
        }
    }
}

impl EngineConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.assets_root.is_none() && self.spin_up_secs.is_none() && self.spin_down_secs.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.assets_root.is_some() {
            fields.push("assets");
        }
        if self.spin_up_secs.is_some() {
            fields.push("spin_up");
        }
        if self.spin_down_secs.is_some() {
            fields.push("spin_down");
        }
        fields
    }
}
