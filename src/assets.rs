use crate::config::AssetConfig;
use crate::mesh::{self, PointCloud};
use crate::model::{Geometry, Model, ModelHandle};
use crate::stages::{placeholder_color, resolve_candidates, StageDefinition, StellarPath};
use anyhow::{anyhow, Result};
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use futures::stream::{FuturesUnordered, StreamExt};
use glam::Vec3;
use rand::Rng;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Asynchronous model source. Implementations resolve a URI to a freshly built model or fail;
/// they never see fallbacks, which the cache layers on top.
pub trait AssetFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<Model>>;
}

/// Reads glTF/GLB files relative to a root directory.
#[derive(Debug, Clone)]
pub struct GltfFetcher {
    root: PathBuf,
}

impl GltfFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, uri: &str) -> PathBuf {
        self.root.join(uri.trim_start_matches('/'))
    }
}

impl AssetFetcher for GltfFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<Model>> {
        async move {
            let path = self.resolve(uri);
            let geometry = mesh::load_gltf(&path)?;
            Ok(Model::new(uri, Geometry::from(geometry)))
        }
        .boxed_local()
    }
}

/// In-memory source keyed by URI. Records every request so callers can see what was fetched.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    models: HashMap<String, Model>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, uri: impl Into<String>, model: Model) -> Self {
        self.models.insert(uri.into(), model);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, model: Model) {
        self.models.insert(uri.into(), model);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, uri: &str) -> usize {
        self.requests.borrow().iter().filter(|requested| requested.as_str() == uri).count()
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<Model>> {
        self.requests.borrow_mut().push(uri.to_string());
        let result = self.models.get(uri).cloned().ok_or_else(|| anyhow!("no asset registered at '{uri}'"));
        future::ready(result).boxed_local()
    }
}

/// Outcome of walking a candidate list: both arms are usable models.
#[derive(Debug)]
pub enum Acquisition {
    Loaded { source: String, model: Model },
    Fallback(Model),
}

impl Acquisition {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Acquisition::Fallback(_))
    }

    pub fn into_model(self) -> Model {
        match self {
            Acquisition::Loaded { model, .. } | Acquisition::Fallback(model) => model,
        }
    }
}

/// Tries each candidate URI for the stage in order; if all fail, builds the stage's placeholder sphere.
pub async fn acquire(fetcher: &dyn AssetFetcher, stage: &StageDefinition) -> Acquisition {
    for uri in resolve_candidates(stage.locator) {
        log::debug!("[{}] trying: {uri}", stage.id);
        match fetcher.fetch(&uri).await {
            Ok(model) => {
                log::info!("[{}] loaded OK: {uri}", stage.id);
                return Acquisition::Loaded { source: uri, model };
            }
            Err(err) => log::warn!("[{}] failed: {uri}: {err:#}", stage.id),
        }
    }
    log::warn!("[{}] all sources failed, using fallback sphere", stage.id);
    Acquisition::Fallback(Model::placeholder_sphere(stage.id, placeholder_color(stage.id)))
}

#[derive(Debug, Clone)]
struct Settled {
    model: ModelHandle,
    fallback: bool,
}

type PendingModel<'a> = Shared<LocalBoxFuture<'a, Settled>>;

fn settle(acquisition: Acquisition, stage: &StageDefinition) -> Settled {
    let fallback = acquisition.is_fallback();
    let mut model = acquisition.into_model();
    if !model.fit_to(stage.display_size) {
        log::warn!("[{}] empty bounding box, using default scale", stage.id);
    }
    model.set_shown(false);
    Settled { model: ModelHandle::new(model), fallback }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreloadSummary {
    /// Acquisitions started by this call, one per locator not already cached.
    pub unique_loads: usize,
    pub fallbacks: usize,
}

/// Locator-keyed model store shared by both paths. Per-path lookups only point into `entries`.
pub struct AssetCache {
    entries: HashMap<&'static str, ModelHandle>,
    lookups: [Vec<Option<ModelHandle>>; 2],
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), lookups: StellarPath::ALL.map(|path| vec![None; path.stages().len()]) }
    }

    /// Loads one model per unique locator across every path. Stages sharing a locator await the
    /// same in-flight load; `on_each_settled(loaded, total)` fires once per unique load.
    pub async fn preload_all<F>(&mut self, fetcher: &dyn AssetFetcher, mut on_each_settled: F) -> PreloadSummary
    where
        F: FnMut(usize, usize),
    {
        let mut in_flight: HashMap<&'static str, PendingModel<'_>> = HashMap::new();
        let mut unique = FuturesUnordered::new();
        let mut bindings = Vec::new();

        for path in StellarPath::ALL {
            for (index, stage) in path.stages().iter().enumerate() {
                let pending = match self.entries.get(stage.locator) {
                    Some(model) => {
                        future::ready(Settled { model: model.clone(), fallback: false }).boxed_local().shared()
                    }
                    None => in_flight
                        .entry(stage.locator)
                        .or_insert_with(|| {
                            let load = async move { settle(acquire(fetcher, stage).await, stage) }
                                .boxed_local()
                                .shared();
                            unique.push(load.clone().map(move |settled| (stage.locator, settled)));
                            load
                        })
                        .clone(),
                };
                bindings.push((path, index, pending));
            }
        }

        let total = unique.len();
        let mut summary = PreloadSummary { unique_loads: total, fallbacks: 0 };
        let mut loaded = 0;
        while let Some((locator, settled)) = unique.next().await {
            loaded += 1;
            if settled.fallback {
                summary.fallbacks += 1;
            }
            self.entries.insert(locator, settled.model);
            on_each_settled(loaded, total);
        }
        for (path, index, pending) in bindings {
            let settled = pending.await;
            self.lookups[path.slot()][index] = Some(settled.model);
        }
        log::info!(
            "[assets] preload complete: {} unique models ({} placeholders)",
            self.entries.len(),
            summary.fallbacks
        );
        summary
    }

    pub fn model(&self, path: StellarPath, index: usize) -> Option<ModelHandle> {
        self.lookups[path.slot()].get(index).cloned().flatten()
    }

    pub fn entry(&self, locator: &str) -> Option<&ModelHandle> {
        self.entries.get(locator)
    }

    pub fn unique_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_preloaded(&self) -> bool {
        self.lookups.iter().all(|lookup| lookup.iter().all(Option::is_some))
    }
}

/// Single, uncached backdrop load. Falls back to a generated starfield.
pub async fn load_background(fetcher: &dyn AssetFetcher, config: &AssetConfig) -> Acquisition {
    match fetcher.fetch(&config.background).await {
        Ok(mut model) => {
            let scale = config.background_scale;
            if let Some(bounds) = model.local_bounds() {
                model.transform.pivot = bounds.center;
            }
            model.transform.scale = scale;
            Acquisition::Loaded { source: config.background.clone(), model }
        }
        Err(err) => {
            log::warn!("[assets] background load failed: {err:#}");
            Acquisition::Fallback(starfield(config.starfield_points, config.starfield_extent, &mut rand::thread_rng()))
        }
    }
}

pub fn starfield(count: usize, extent: f32, rng: &mut impl Rng) -> Model {
    let mut coord = || (rng.gen::<f32>() - 0.5) * extent;
    let positions = (0..count).map(|_| Vec3::new(coord(), coord(), coord())).collect();
    Model::new("starfield", Geometry::Points(PointCloud { positions, color: 0xffffff, point_size: 0.15 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{HIGH_MASS_STAGES, LOW_MASS_STAGES};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere(name: &str) -> Model {
        Model::placeholder_sphere(name, 0x123456)
    }

    #[test]
    fn first_successful_candidate_wins() {
        let stage = &LOW_MASS_STAGES[3];
        let fetcher = MemoryFetcher::new()
            .with_model("3d_models/RedGiant/model.gltf", sphere("model"))
            .with_model("3d_models/RedGiant/model.glb", sphere("glb"));
        let acquisition = pollster::block_on(acquire(&fetcher, stage));
        match acquisition {
            Acquisition::Loaded { source, model } => {
                assert_eq!(source, "3d_models/RedGiant/model.gltf");
                assert_eq!(model.name, "model");
            }
            Acquisition::Fallback(_) => panic!("expected a loaded model"),
        }
        assert_eq!(
            fetcher.requests(),
            vec!["3d_models/RedGiant/RedGiant.gltf", "3d_models/RedGiant/scene.gltf", "3d_models/RedGiant/model.gltf"]
        );
    }

    #[test]
    fn exhausted_candidates_yield_placeholder() {
        let stage = &HIGH_MASS_STAGES[4];
        let fetcher = MemoryFetcher::new();
        let acquisition = pollster::block_on(acquire(&fetcher, stage));
        assert!(acquisition.is_fallback());
        assert_eq!(fetcher.requests().len(), 4);
        let model = acquisition.into_model();
        assert_eq!(model.name, "supernova");
        match model.geometry {
            Geometry::Mesh { material, .. } => assert_eq!(material.color, placeholder_color("supernova")),
            Geometry::Points(_) => panic!("placeholder should be a mesh"),
        }
    }

    #[test]
    fn settled_models_start_hidden_and_fitted() {
        let stage = &LOW_MASS_STAGES[0];
        let settled = settle(Acquisition::Fallback(sphere("nebula")), stage);
        let model = settled.model.borrow();
        assert!(!model.visible);
        assert_eq!(model.opacity, 0.0);
        let diagonal = model.local_bounds().unwrap().diagonal() * model.transform.scale;
        assert!((diagonal - stage.display_size).abs() < 1e-4);
    }

    #[test]
    fn missing_background_generates_starfield() {
        let config = AssetConfig { starfield_points: 120, ..AssetConfig::default() };
        let acquisition = pollster::block_on(load_background(&MemoryFetcher::new(), &config));
        assert!(acquisition.is_fallback());
        match acquisition.into_model().geometry {
            Geometry::Points(cloud) => {
                assert_eq!(cloud.positions.len(), 120);
                let half = config.starfield_extent * 0.5;
                assert!(cloud.positions.iter().all(|p| p.abs().max_element() <= half));
            }
            Geometry::Mesh { .. } => panic!("starfield should be a point cloud"),
        }
    }

    #[test]
    fn background_is_scaled_by_fixed_factor() {
        let config = AssetConfig::default();
        let fetcher = MemoryFetcher::new().with_model(config.background.clone(), sphere("bg"));
        let model = pollster::block_on(load_background(&fetcher, &config)).into_model();
        assert_eq!(model.transform.scale, config.background_scale);
        assert!(model.visible);
    }

    #[test]
    fn starfield_is_reproducible_with_seeded_rng() {
        let a = starfield(16, 10.0, &mut StdRng::seed_from_u64(7));
        let b = starfield(16, 10.0, &mut StdRng::seed_from_u64(7));
        match (a.geometry, b.geometry) {
            (Geometry::Points(a), Geometry::Points(b)) => assert_eq!(a.positions, b.positions),
            _ => panic!("starfields are point clouds"),
        }
    }
}
