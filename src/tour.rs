use crate::engine::PathEngine;
use crate::scene::SceneContainer;
use crate::stages::{format_duration_years, StageDefinition};
use crate::time::FrameClock;
use crate::transition::Progress;
use anyhow::{bail, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Drives the engine from the first to the last stage of the active path on `clock`,
/// giving each transition at most `frames_per_stage` ticks. Returns the ids reported ready.
pub fn run_tour<S: SceneContainer>(
    engine: &mut PathEngine<S>,
    clock: &mut FrameClock,
    frames_per_stage: u32,
) -> Result<Vec<&'static str>> {
    let visited: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let stage_count = engine.active_stages().len();

    for index in 0..stage_count {
        if index == engine.current_index() && engine.current_model().is_some() {
            describe(engine.current_stage());
            visited.borrow_mut().push(engine.current_stage().id);
            continue;
        }
        let sink = Rc::clone(&visited);
        let started = engine.transition_to(index, move |_: Progress, stage: &'static StageDefinition| {
            describe(stage);
            sink.borrow_mut().push(stage.id);
        });
        if !started {
            bail!("stage {index} could not be shown; were models preloaded?");
        }
        let mut frames = 0;
        while engine.is_animating() {
            if frames == frames_per_stage {
                bail!("stage {index} did not settle within {frames_per_stage} frames");
            }
            engine.tick(clock.tick());
            frames += 1;
        }
    }

    let visited = visited.borrow().clone();
    Ok(visited)
}

fn describe(stage: &StageDefinition) {
    log::info!(
        "[tour] {}: {} (lasts {})",
        stage.label,
        stage.description,
        format_duration_years(stage.duration_years)
    );
}
