use crate::nav::{NavAgent, has_arrived};
use log::warn;
use warden_core::{Dt, GuardConfig, Shared, Signal, Transform, Vec3};
use warden_fsm::State;

/// Walks back to the post and reports when it got there.
///
/// The arrival flag is published through a [`Signal`] so that a transition
/// guard can read it without touching the state.
#[derive(Debug)]
pub struct ReturnState<A: NavAgent> {
    agent: Shared<A>,
    body: Shared<Transform>,
    post: Option<Vec3>,
    arrived: Signal<bool>,
    arrive_tolerance: f32,
}

impl<A: NavAgent> ReturnState<A> {
    pub fn new(agent: Shared<A>, body: Shared<Transform>, post: Option<Vec3>) -> Self {
        Self {
            agent,
            body,
            post,
            arrived: Signal::new(false),
            arrive_tolerance: GuardConfig::default().arrive_tolerance,
        }
    }

    pub fn with_arrive_tolerance(mut self, tolerance: f32) -> Self {
        self.arrive_tolerance = tolerance;
        self
    }

    /// Read handle of the "back at the post" flag.
    pub fn arrived(&self) -> Signal<bool> {
        self.arrived.clone()
    }
}

impl<A: NavAgent> State for ReturnState<A> {
    fn name(&self) -> &str {
        "Return"
    }

    fn on_enter(&mut self) {
        self.arrived.set(false);

        let here = self.body.borrow().pos;
        let destination = self.post.unwrap_or(here);

        let mut agent = self.agent.borrow_mut();
        agent.set_stopped(false);
        if !agent.set_destination(destination) {
            warn!("Post at {destination:?} is unreachable, standing down in place");
            if !agent.set_destination(here) {
                warn!("Cannot hold position at {here:?} either");
            }
        }
    }

    fn on_update(&mut self, _dt: Dt) {
        if has_arrived(&*self.agent.borrow(), self.arrive_tolerance) {
            self.arrived.set(true);
        }
    }
}
