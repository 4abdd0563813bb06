//! End-to-end runs of a guard against scripted and grid-backed collaborators.

use std::cell::Cell;
use std::rc::Rc;
use warden_ai::{
    Clock, FieldOfView, GridAgent, GuardAgent, ManualClock, NavAgent, NavGrid, NavQuery, Target,
};
use warden_core::{Dt, GuardConfig, Shared, Transform, Vec3, planar_distance, shared};

const FRAME: Dt = Dt::from_millis(50);

/// Navigation stub that teleports on demand.
#[derive(Debug, Default)]
struct ScriptedAgent {
    destination: Option<Vec3>,
    remaining: f32,
    stopped: bool,
}

impl NavAgent for ScriptedAgent {
    fn set_destination(&mut self, point: Vec3) -> bool {
        self.destination = Some(point);
        true
    }

    fn is_path_pending(&self) -> bool {
        false
    }

    fn remaining_distance(&self) -> f32 {
        self.remaining
    }

    fn stopping_distance(&self) -> f32 {
        0.0
    }

    fn velocity(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, 0.0)
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }
}

#[derive(Debug)]
struct OpenField;

impl NavQuery for OpenField {
    fn sample_position(&self, near: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(near)
    }
}

struct Scripted {
    guard: GuardAgent<ManualClock>,
    clock: ManualClock,
    agent: Shared<ScriptedAgent>,
}

impl Scripted {
    fn new() -> Self {
        let agent = shared(ScriptedAgent {
            remaining: 3.0,
            ..ScriptedAgent::default()
        });
        let clock = ManualClock::new();
        let guard = GuardAgent::new(
            agent.clone(),
            shared(Transform::default()),
            Rc::new(OpenField),
            Some(Vec3::new(0.0, 0.0, 0.0)),
            Target::fixed(Vec3::new(0.0, 0.0, 9.0)),
            clock.clone(),
            &GuardConfig::default().with_patrol_seed(11),
        )
        .unwrap();
        Self { guard, clock, agent }
    }

    fn run(&mut self, frames: usize, visible: bool) {
        for _ in 0..frames {
            self.clock.advance(FRAME);
            self.guard.update(FRAME, &visible).unwrap();
        }
    }
}

#[test]
fn guard_chases_gives_up_and_resumes_patrol() {
    let mut world = Scripted::new();

    world.run(10, false);
    assert_eq!(world.guard.state_name(), Some("Patrol"));

    world.run(1, true);
    assert_eq!(world.guard.state_name(), Some("Chase"));
    assert_eq!(
        world.agent.borrow().destination,
        Some(Vec3::new(0.0, 0.0, 9.0))
    );

    // Two seconds unseen are tolerated.
    world.run(40, false);
    assert_eq!(world.guard.state_name(), Some("Chase"));

    world.run(1, false);
    assert_eq!(world.guard.state_name(), Some("Return"));
    assert_eq!(
        world.agent.borrow().destination,
        Some(Vec3::new(0.0, 0.0, 0.0))
    );

    // Still walking home.
    world.run(5, false);
    assert_eq!(world.guard.state_name(), Some("Return"));

    world.agent.borrow_mut().remaining = 0.0;
    world.run(1, false);
    assert!(world.guard.is_back_at_post());
    world.run(1, false);
    assert_eq!(world.guard.state_name(), Some("Patrol"));
    assert_eq!(
        world.guard.machine().previous_state(),
        Some(world.guard.states().ret)
    );
}

#[test]
fn glimpses_keep_the_chase_alive() {
    let mut world = Scripted::new();
    world.run(1, true);

    for _ in 0..5 {
        world.run(30, false);
        world.run(1, true);
    }

    assert_eq!(world.guard.state_name(), Some("Chase"));
    assert_eq!(world.guard.last_seen(), Some(world.clock.elapsed()));
}

/// Out of sight for a guard facing +Z from near the origin.
fn behind() -> Vec3 {
    Vec3::new(0.0, 0.0, -11.0)
}

/// Guard and intruder on an obstacle grid, seen through a real field of view.
struct Arena {
    grid: Rc<NavGrid>,
    guard: GuardAgent<ManualClock>,
    clock: ManualClock,
    walker: Shared<GridAgent>,
    body: Shared<Transform>,
    intruder: Rc<Cell<Vec3>>,
    eyes: FieldOfView,
    visited: Vec<String>,
}

impl Arena {
    fn new() -> Self {
        let mut grid = NavGrid::new(0.5, Vec3::new(-12.0, 0.0, -12.0), Vec3::new(12.0, 0.0, 12.0));
        grid.add_obstacle(Vec3::new(-6.0, 0.0, 0.0), Vec3::new(0.5, 1.0, 3.0));
        let grid = Rc::new(grid);

        let body = shared(Transform::default());
        let walker = shared(GridAgent::new(grid.clone(), body.clone(), 3.0));
        let intruder = Rc::new(Cell::new(behind()));
        let target = {
            let intruder = intruder.clone();
            Target::new(move || Some(intruder.get()))
        };
        let clock = ManualClock::new();
        let config = GuardConfig::default()
            .with_patrol_radius(2.0)
            .with_patrol_seed(5);

        let guard = GuardAgent::new(
            walker.clone(),
            body.clone(),
            grid.clone(),
            None,
            target,
            clock.clone(),
            &config,
        )
        .unwrap();

        Self {
            grid,
            guard,
            clock,
            walker,
            body,
            intruder,
            eyes: FieldOfView::from_config(&config),
            visited: vec!["Patrol".to_string()],
        }
    }

    fn frame(&mut self) {
        self.clock.advance(FRAME);
        self.eyes
            .update(&self.body.borrow(), Some(self.intruder.get()), &*self.grid);
        self.guard.update(FRAME, &self.eyes).unwrap();
        self.walker.borrow_mut().step(FRAME);

        if let Some(name) = self.guard.state_name()
            && self.visited.last().map(String::as_str) != Some(name)
        {
            self.visited.push(name.to_string());
        }
    }

    /// Runs frames until `done` holds, up to `limit` frames.
    fn run_until(&mut self, limit: usize, done: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..limit {
            self.frame();
            if done(self) {
                return true;
            }
        }
        false
    }
}

#[test]
fn guard_engages_intruder_on_grid() {
    let mut arena = Arena::new();

    // Patrols without noticing someone behind it.
    assert!(!arena.run_until(60, |a| a.guard.state_name() != Some("Patrol")));
    let post = Vec3::new(0.0, 0.0, 0.0);
    assert!(planar_distance(arena.body.borrow().pos, post) <= 2.0 + 0.5);

    arena.intruder.set(Vec3::new(0.0, 0.0, 6.0));
    assert!(arena.run_until(200, |a| a.guard.strikes() >= 2));
    assert!(planar_distance(arena.body.borrow().pos, arena.intruder.get()) <= 1.8);

    arena.intruder.set(behind());
    assert!(arena.run_until(200, |a| a.guard.state_name() == Some("Return")));
    assert!(arena.run_until(200, |a| a.guard.state_name() == Some("Patrol")));
    assert!(planar_distance(arena.body.borrow().pos, post) <= 0.5);

    assert_eq!(
        arena.visited,
        ["Patrol", "Chase", "Attack", "Return", "Patrol"]
    );
}
