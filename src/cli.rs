use crate::config::{EngineConfigOverrides, DEFAULT_CONFIG_PATH};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MASS: f32 = 1.0;
pub const DEFAULT_FPS: f32 = 60.0;
/// Per-stage frame cap for the headless tour.
pub const DEFAULT_FRAMES: u32 = 600;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    mass: Option<f32>,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
    frames: Option<u32>,
    fps: Option<f32>,
    spin_up: Option<f32>,
    spin_down: Option<f32>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // program name
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name <value>.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "mass" => overrides.mass = Some(parse_positive("mass", &value)?),
                "assets" => overrides.assets = Some(PathBuf::from(value)),
                "config" => overrides.config = Some(PathBuf::from(value)),
                "frames" => {
                    let frames = value.parse::<u32>().with_context(|| format!("Invalid frames '{value}'"))?;
                    if frames == 0 {
                        bail!("--frames must be at least 1");
                    }
                    overrides.frames = Some(frames);
                }
                "fps" => overrides.fps = Some(parse_positive("fps", &value)?),
                "spin-up" => overrides.spin_up = Some(parse_seconds("spin-up", &value)?),
                "spin-down" => overrides.spin_down = Some(parse_seconds("spin-down", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --mass, --assets, --config, --frames, --fps, \
                     --spin-up, --spin-down."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn mass(&self) -> f32 {
        self.mass.unwrap_or(DEFAULT_MASS)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn frames(&self) -> u32 {
        self.frames.unwrap_or(DEFAULT_FRAMES)
    }

    pub fn fps(&self) -> f32 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }

    pub fn config_overrides(&self) -> EngineConfigOverrides {
        EngineConfigOverrides {
            assets_root: self.assets.clone(),
            spin_up_secs: self.spin_up,
            spin_down_secs: self.spin_down,
        }
    }
}

fn parse_positive(flag: &str, value: &str) -> Result<f32> {
    let parsed = value.parse::<f32>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        bail!("--{flag} must be a positive number, got '{value}'");
    }
    Ok(parsed)
}

fn parse_seconds(flag: &str, value: &str) -> Result<f32> {
    let parsed = value.parse::<f32>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        bail!("--{flag} must be zero or more seconds, got '{value}'");
    }
    Ok(parsed)
}
