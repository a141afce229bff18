use anyhow::{Context, Result};
use env_logger::Env;
use stellar_path::cli::CliOverrides;
use stellar_path::stages::{format_duration_years, validate_mass};
use stellar_path::time::FrameClock;
use stellar_path::tour::run_tour;
use stellar_path::{EngineConfig, GltfFetcher, PathEngine, SceneGraph};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(cli) {
        log::error!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: CliOverrides) -> Result<()> {
    let mass = validate_mass(cli.mass()).context("Invalid --mass")?;
    let mut config = EngineConfig::load_or_default(cli.config_path());
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        log::info!("[cli] overriding {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let fetcher = GltfFetcher::new(config.assets.root.clone());
    log::info!("[assets] loading models from {}", fetcher.root().display());
    let mut engine = PathEngine::new(SceneGraph::new(), config);
    let summary = pollster::block_on(engine.preload_all(&fetcher, |loaded, total| {
        log::info!("[assets] {loaded}/{total} models ready");
    }));
    if summary.fallbacks > 0 {
        log::warn!("[assets] {} of {} models are placeholders", summary.fallbacks, summary.unique_loads);
    }
    pollster::block_on(engine.load_background(&fetcher));

    engine.select_path(mass);
    let mut clock = FrameClock::fixed(cli.fps());
    let visited = run_tour(&mut engine, &mut clock, cli.frames())?;

    let total_years: f64 = engine.active_stages().iter().map(|stage| stage.duration_years).sum();
    log::info!(
        "[tour] {} stages on the {} path in {:.1}s of frame time; lifetime ~{}",
        visited.len(),
        engine.active_path().label(),
        clock.elapsed_seconds(),
        format_duration_years(total_years)
    );
    Ok(())
}
