use super::Target;
use crate::nav::NavAgent;
use log::debug;
use warden_core::{Dt, GuardConfig, Shared, Transform};
use warden_fsm::State;

/// Runs after the target, re-pathing every frame.
///
/// The guard turns smoothly to face where it is moving, so it looks ahead
/// instead of sliding sideways around corners.
#[derive(Debug)]
pub struct ChaseState<A: NavAgent> {
    agent: Shared<A>,
    body: Shared<Transform>,
    target: Target,
    turn_rate: f32,
}

impl<A: NavAgent> ChaseState<A> {
    /// Creates a new chase state.
    ///
    /// # Arguments
    ///
    /// * `agent` - Movement handle of the guard.
    /// * `body` - The guard's transform, rotated towards the movement.
    /// * `target` - Where to run to. Without a target the guard holds still.
    pub fn new(agent: Shared<A>, body: Shared<Transform>, target: Target) -> Self {
        Self {
            agent,
            body,
            target,
            turn_rate: GuardConfig::default().turn_rate,
        }
    }

    pub fn with_turn_rate(mut self, turn_rate: f32) -> Self {
        self.turn_rate = turn_rate;
        self
    }
}

impl<A: NavAgent> State for ChaseState<A> {
    fn name(&self) -> &str {
        "Chase"
    }

    fn on_enter(&mut self) {
        self.agent.borrow_mut().set_stopped(false);
    }

    fn on_update(&mut self, dt: Dt) {
        let destination = self
            .target
            .position()
            .unwrap_or_else(|| self.body.borrow().pos);

        let mut agent = self.agent.borrow_mut();
        if !agent.set_destination(destination) {
            debug!("Chase target at {destination:?} is unreachable");
        }

        let velocity = agent.velocity();
        self.body
            .borrow_mut()
            .turn_towards(velocity, dt.as_secs_f32() * self.turn_rate);
    }
}
