use std::cell::{Cell, RefCell};
use std::rc::Rc;
use stellar_path::stages::{HIGH_MASS_STAGES, LOW_MASS_STAGES};
use stellar_path::{
    EngineConfig, MemoryFetcher, Model, NavigationCommand, PathEngine, Progress, SceneGraph, StageDefinition,
    StellarPath,
};

const FRAME: f32 = 1.0 / 60.0;

fn nebula_fetcher() -> MemoryFetcher {
    MemoryFetcher::new().with_model("3d_models/Nebula/Nebula.gltf", Model::placeholder_sphere("nebula.gltf", 0x8844cc))
}

fn engine_with(fetcher: &MemoryFetcher) -> PathEngine {
    let mut engine = PathEngine::new(SceneGraph::new(), EngineConfig::default());
    pollster::block_on(engine.preload_all(fetcher, |_, _| {}));
    engine
}

fn run_until_idle(engine: &mut PathEngine) -> usize {
    let mut frames = 0;
    while engine.is_animating() {
        assert!(frames < 1_000, "transition never settled");
        engine.tick(FRAME);
        frames += 1;
    }
    frames
}

#[test]
fn mass_threshold_selects_branch() {
    let mut engine = engine_with(&MemoryFetcher::new());
    for (mass, expected) in [(0.5, StellarPath::LowMass), (8.0, StellarPath::LowMass), (8.01, StellarPath::HighMass)] {
        engine.select_path(mass);
        assert_eq!(engine.active_path(), expected, "mass {mass}");
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.stellar_mass(), mass);
    }
    engine.select_path(40.0);
    assert_eq!(engine.active_stages(), &HIGH_MASS_STAGES[..]);
}

#[test]
fn full_cycle_ends_idle_with_one_model() {
    let mut engine = engine_with(&MemoryFetcher::new());
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    assert!(engine.transition_to(0, move |_: Progress, _: &'static StageDefinition| counter.set(counter.get() + 1)));
    assert!(engine.is_animating());
    run_until_idle(&mut engine);

    assert_eq!(fired.get(), 1);
    assert!(!engine.is_animating());
    assert_eq!(engine.current_index(), 0);
    assert_eq!(engine.scene().model_count(), 1);
    let current = engine.current_model().expect("a model is showing");
    assert!(engine.scene().contains_model(current));
    assert!(current.borrow().visible);
    assert_eq!(current.borrow().opacity, 1.0);
}

#[test]
fn transition_while_animating_is_ignored() {
    let mut engine = engine_with(&MemoryFetcher::new());
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);

    let ready: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let first = Rc::clone(&ready);
    let second = Rc::clone(&ready);
    assert!(engine.transition_to(1, move |_: Progress, stage: &'static StageDefinition| first.borrow_mut().push(stage.id)));
    engine.tick(FRAME);
    assert!(!engine.transition_to(3, move |_: Progress, stage: &'static StageDefinition| second.borrow_mut().push(stage.id)));
    assert!(!engine.next(|_, _| {}));
    run_until_idle(&mut engine);

    assert_eq!(engine.current_index(), 1);
    assert_eq!(*ready.borrow(), vec!["protostar"]);
}

#[test]
fn never_more_than_one_stage_model_attached() {
    let mut engine = engine_with(&MemoryFetcher::new());
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    engine.transition_to(2, |_, _| {});
    while engine.is_animating() {
        engine.tick(FRAME);
        assert_eq!(engine.scene().model_count(), 1);
    }
    assert!(engine.current_model().unwrap().ptr_eq(&engine.cache().model(StellarPath::LowMass, 2).unwrap()));
}

#[test]
fn navigation_stops_at_both_ends() {
    let mut engine = engine_with(&MemoryFetcher::new());
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    assert!(engine.is_first());
    assert!(!engine.prev(|_, _| {}));
    assert!(!engine.navigate(NavigationCommand::Prev, |_, _| {}));

    engine.transition_to(4, |_, _| {});
    run_until_idle(&mut engine);
    assert!(engine.is_last());
    assert!(!engine.next(|_, _| {}));
    assert!(!engine.is_animating());
    assert_eq!(engine.current_index(), 4);
}

#[test]
fn low_mass_tour_reaches_white_dwarf() {
    let mut engine = engine_with(&MemoryFetcher::new());
    engine.select_path(5.0);
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    for _ in 0..4 {
        assert!(engine.navigate(NavigationCommand::Next, |_, _| {}));
        run_until_idle(&mut engine);
    }
    assert_eq!(engine.current_stage().id, "white_dwarf");
    assert_eq!(engine.current_stage(), &LOW_MASS_STAGES[4]);
    assert!(engine.is_last());
}

#[test]
fn high_mass_path_reuses_preloaded_nebula() {
    let fetcher = nebula_fetcher();
    let mut engine = engine_with(&fetcher);
    let fetched = fetcher.request_count("3d_models/Nebula/Nebula.gltf");
    assert_eq!(fetched, 1);

    engine.select_path(20.0);
    assert!(engine.transition_to(0, |_, _| {}));
    run_until_idle(&mut engine);

    assert_eq!(fetcher.request_count("3d_models/Nebula/Nebula.gltf"), fetched);
    let shown = engine.current_model().unwrap();
    assert_eq!(shown.name(), "nebula.gltf");
    assert!(shown.ptr_eq(&engine.cache().model(StellarPath::LowMass, 0).unwrap()));
}

#[test]
fn switching_paths_carries_the_shared_instance() {
    let mut engine = engine_with(&nebula_fetcher());
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    let low_nebula = engine.current_model().unwrap().clone();

    engine.select_path(12.0);
    assert_eq!(engine.scene().model_count(), 0);
    assert!(!low_nebula.borrow().visible);
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    assert!(engine.current_model().unwrap().ptr_eq(&low_nebula));
    assert!(low_nebula.borrow().visible);
}

#[test]
fn stage_lighting_follows_the_swap() {
    let mut engine = engine_with(&MemoryFetcher::new());
    engine.select_path(30.0);
    engine.transition_to(0, |_, _| {});
    run_until_idle(&mut engine);
    engine.transition_to(4, |_, _| {});
    run_until_idle(&mut engine);

    let supernova = &HIGH_MASS_STAGES[4];
    assert_eq!(engine.lighting().point.get().intensity, supernova.light_intensity);
    assert_eq!(engine.lighting().ambient.get().intensity, supernova.ambient_intensity);
    for _ in 0..60 {
        engine.tick(FRAME);
    }
    assert!((engine.camera().distance() - supernova.camera_distance).abs() < 1e-4);
}
