//! A guard watches a courtyard while an intruder walks a scripted route.
//!
//! Run with `RUST_LOG=debug` to see every transition.

use cgmath::{InnerSpace, VectorSpace};
use log::{LevelFilter, info};
use std::cell::Cell;
use std::rc::Rc;
use warden_ai::{FieldOfView, GridAgent, GuardAgent, ManualClock, NavGrid, Target};
use warden_core::{Dt, GuardConfig, Vec3, shared};

const FRAME: Dt = Dt::from_micros(16_667);
const FIXED_STEP: Dt = Dt::from_millis(20);
const DURATION: Dt = Dt::from_secs(40);

/// Intruder route: (arrival time in seconds, position).
static ROUTE: [(f32, [f32; 3]); 6] = [
    (0.0, [-9.0, 0.0, -9.0]),
    (6.0, [-9.0, 0.0, 9.0]),
    (10.0, [0.0, 0.0, 7.0]),
    (14.0, [1.0, 0.0, 4.0]),
    (20.0, [1.5, 0.0, 4.5]),
    (24.0, [9.0, 0.0, -9.0]),
];

/// Where the intruder stands at `t`, interpolated along [`ROUTE`].
fn intruder_at(t: f32) -> Vec3 {
    let leg = ROUTE.windows(2).find(|leg| t < leg[1].0);
    match leg {
        Some([(t0, a), (t1, b)]) => {
            let a = Vec3::from(*a);
            let b = Vec3::from(*b);
            a.lerp(b, (t - t0) / (t1 - t0))
        }
        _ => Vec3::from(ROUTE[ROUTE.len() - 1].1),
    }
}

fn build_courtyard() -> NavGrid {
    let mut grid = NavGrid::new(0.5, Vec3::new(-12.0, 0.0, -12.0), Vec3::new(12.0, 0.0, 12.0));

    // Pillars
    for x in [-4.0, 4.0] {
        for z in [-4.0, 4.0] {
            grid.add_obstacle(Vec3::new(x, 0.0, z), Vec3::new(0.75, 2.0, 0.75));
        }
    }
    // Low wall along the west side
    grid.add_obstacle(Vec3::new(-7.0, 0.0, 0.0), Vec3::new(0.25, 1.0, 5.0));

    grid
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger
    let mut env_builder = env_logger::Builder::new();
    env_builder.filter_level(LevelFilter::Info);
    env_builder.parse_default_env();
    env_builder.init();

    let config = GuardConfig::default().with_patrol_radius(4.0);
    let grid = Rc::new(build_courtyard());
    let post = Vec3::new(0.0, 0.0, 0.0);

    let body = shared(warden_core::Transform::new(post));
    let walker = shared(GridAgent::new(grid.clone(), body.clone(), 3.5));
    let intruder = Rc::new(Cell::new(intruder_at(0.0)));
    let target = {
        let intruder = intruder.clone();
        Target::new(move || Some(intruder.get()))
    };
    let clock = ManualClock::new();

    let mut guard = GuardAgent::new(
        walker.clone(),
        body.clone(),
        grid.clone(),
        Some(post),
        target,
        clock.clone(),
        &config,
    )?;
    let mut eyes = FieldOfView::from_config(&config);

    let mut accumulator = Dt::ZERO;
    let mut elapsed = Dt::ZERO;
    let mut last_state = guard.state_name().map(str::to_owned);
    info!("Guard starts in {}", last_state.as_deref().unwrap_or("?"));

    while elapsed < DURATION {
        elapsed += FRAME;
        clock.advance(FRAME);
        intruder.set(intruder_at(elapsed.as_secs_f32()));

        eyes.update(&body.borrow(), Some(intruder.get()), &*grid);
        guard.update(FRAME, &eyes)?;
        walker.borrow_mut().step(FRAME);

        accumulator += FRAME;
        while accumulator >= FIXED_STEP {
            guard.fixed_update(FIXED_STEP)?;
            accumulator -= FIXED_STEP;
        }

        let state = guard.state_name().map(str::to_owned);
        if state != last_state {
            let distance = (intruder.get() - body.borrow().pos).magnitude();
            info!(
                "{:>6.2}s  {} -> {}  (intruder {:.1} m away, {} strikes)",
                elapsed.as_secs_f32(),
                last_state.as_deref().unwrap_or("?"),
                state.as_deref().unwrap_or("?"),
                distance,
                guard.strikes()
            );
            last_state = state;
        }
    }

    info!(
        "Done after {:.1}s: {} strikes, guard at {:?}",
        elapsed.as_secs_f32(),
        guard.strikes(),
        body.borrow().pos
    );

    Ok(())
}
