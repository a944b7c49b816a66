//! Headless demo
//!
//! Loads a level, drives the player's entity from a canned input script and
//! logs locomotion changes. Run with `RUST_LOG=debug` to see every entity's
//! transitions.
//!
//! ```text
//! kinetic_demo [hardbox|web|softbox] [session.toml|session.ron]
//! ```

mod levels;

use std::cell::RefCell;
use std::rc::Rc;

use kinetic_engine::prelude::*;
use kinetic_engine::foundation::logging::{error, info, warn};

/// Frames to simulate
const FRAMES: u64 = 900;

/// Frame at which the web level stiffens its joints
const STIFFEN_AT: u64 = 450;

fn demo_input() -> ScriptedInput {
    let idle = InputSnapshot::new();
    let right = InputSnapshot::new().with_key(KeyCode::D);
    let left = InputSnapshot::new().with_key(KeyCode::Left);
    let jump = InputSnapshot::new().with_key(KeyCode::Space);

    ScriptedInput::new()
        .hold(60, idle.clone())
        .hold(60, right.clone())
        .hold(2, right.clone().with_key(KeyCode::Space))
        .hold(20, right)
        .hold(90, idle.clone())
        .hold(1, jump)
        .hold(60, idle)
        .hold(150, left)
}

/// Hero mode and transition count after a run
struct Outcome {
    mode: LocomotionMode,
    changes: usize,
}

/// Run exactly [`FRAMES`] fixed steps, logging the hero's transitions
fn play(session: &mut GameSession, level: &dyn levels::Level, hero: EntityHandle) -> kinetic_engine::Result<Outcome> {
    let step = session.scene().config().fixed_dt;
    let mut mode = session.state_of(hero)?.mode();
    let mut changes = 0;

    while session.frame() < FRAMES {
        session.run_frame(step)?;

        if level.name() == "web" && session.frame() == STIFFEN_AT {
            let joints = session.entity(hero)?.joints().len();
            for index in 0..joints {
                session.tune_joint(hero, index, JointParams::from_frequency(5.0, 0.7))?;
            }
            info!("Stiffened {joints} joints at frame {}", session.frame());
        }

        let current = session.state_of(hero)?.mode();
        if current != mode {
            info!("[frame {}] hero {mode:?} -> {current:?}", session.frame());
            mode = current;
            changes += 1;
        }
    }

    Ok(Outcome { mode, changes })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let level_name = args.next().unwrap_or_else(|| "hardbox".to_string());
    let config = match args.next() {
        Some(path) => SessionConfig::load_from_file(&path).map_err(|e| {
            error!("Could not load session config '{path}': {e}");
            e
        })?,
        None => SessionConfig::default(),
    };

    let level = levels::by_name(&level_name).ok_or_else(|| format!("Unknown level '{level_name}'"))?;
    let sink = Rc::new(RefCell::new(HeadlessSink::new()));
    let mut session = GameSession::new(config, demo_input(), Rc::clone(&sink))?;

    let hero = level.load(&mut session)?;
    let controller = session.add_controller(Controller::new(BindingConfig::default().build()?))?;
    session.possess(controller, hero)?;
    info!("Loaded '{}' with {} entities", level.name(), session.entity_count());

    let mut stopwatch = Stopwatch::start_new();
    let Outcome { mode, changes } = play(&mut session, level.as_ref(), hero)?;
    stopwatch.stop();

    let hero_pose = session.scene().world().pose(session.entity(hero)?.anchor_body())?;
    info!(
        "Ran {} frames in {:.1} ms: {changes} hero transitions, ended {mode:?} at ({:.2}, {:.2})",
        session.frame(),
        stopwatch.elapsed_millis(),
        hero_pose.translation.x,
        hero_pose.translation.y
    );

    let submitted = sink.borrow();
    if submitted.frames() != session.frame() {
        warn!("Sink saw {} frames for {} simulated", submitted.frames(), session.frame());
    }
    info!("Last frame carried {} entities", submitted.last_frame().len());

    Ok(())
}
