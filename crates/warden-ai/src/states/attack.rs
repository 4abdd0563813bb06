use super::Target;
use crate::nav::NavAgent;
use log::{debug, info};
use warden_core::{Dt, GuardConfig, Shared, Signal, Transform, Vec3, planar_distance};
use warden_fsm::State;

/// Closes in on the target and strikes at a fixed rhythm while in reach.
///
/// The anchor is the target's position, or the post while the target is
/// unknown. Out of reach the guard keeps walking to the anchor; in reach it
/// stops and faces the anchor. While the target is located it lands a strike
/// every `dwell_time`. The engagement timer restarts whenever the guard has to
/// close in again.
#[derive(Debug)]
pub struct AttackState<A: NavAgent> {
    agent: Shared<A>,
    body: Shared<Transform>,
    post: Option<Vec3>,
    radius: f32,
    dwell_time: Dt,
    target: Target,
    timer: Dt,
    anchor: Vec3,
    has_target: bool,
    strikes: Signal<u32>,
    turn_rate: f32,
}

impl<A: NavAgent> AttackState<A> {
    /// Creates a new attack state.
    ///
    /// # Arguments
    ///
    /// * `agent` - Movement handle of the guard.
    /// * `body` - The guard's transform.
    /// * `post` - Fallback anchor while there is no target.
    /// * `radius` - Reach within which the guard strikes.
    /// * `dwell_time` - Time between two strikes.
    /// * `target` - What to attack.
    pub fn new(
        agent: Shared<A>,
        body: Shared<Transform>,
        post: Option<Vec3>,
        radius: f32,
        dwell_time: Dt,
        target: Target,
    ) -> Self {
        let anchor = post.unwrap_or_else(|| body.borrow().pos);
        Self {
            agent,
            body,
            post,
            radius,
            dwell_time,
            target,
            timer: Dt::ZERO,
            anchor,
            has_target: false,
            strikes: Signal::new(0),
            turn_rate: GuardConfig::default().turn_rate,
        }
    }

    pub fn with_turn_rate(mut self, turn_rate: f32) -> Self {
        self.turn_rate = turn_rate;
        self
    }

    /// Read handle of the number of strikes landed so far.
    pub fn strikes(&self) -> Signal<u32> {
        self.strikes.clone()
    }

    /// Position the guard is currently engaging.
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    fn acquire_anchor(&mut self) {
        let located = self.target.position();
        self.has_target = located.is_some();
        self.anchor = located
            .or(self.post)
            .unwrap_or_else(|| self.body.borrow().pos);
    }
}

impl<A: NavAgent> State for AttackState<A> {
    fn name(&self) -> &str {
        "Attack"
    }

    fn on_enter(&mut self) {
        self.timer = Dt::ZERO;
        self.acquire_anchor();
        self.agent.borrow_mut().set_stopped(false);
    }

    fn on_update(&mut self, dt: Dt) {
        self.acquire_anchor();

        let here = self.body.borrow().pos;
        let mut agent = self.agent.borrow_mut();

        if planar_distance(here, self.anchor) > self.radius {
            self.timer = Dt::ZERO;
            agent.set_stopped(false);
            if !agent.set_destination(self.anchor) {
                debug!("Attack anchor at {:?} is unreachable", self.anchor);
            }
            return;
        }

        agent.set_stopped(true);
        self.body
            .borrow_mut()
            .turn_towards(self.anchor - here, dt.as_secs_f32() * self.turn_rate);

        // Holding the post is not an engagement.
        if !self.has_target {
            self.timer = Dt::ZERO;
            return;
        }

        self.timer += dt;
        if self.timer >= self.dwell_time {
            self.timer = Dt::ZERO;
            self.strikes.set(self.strikes.get() + 1);
            info!("Strike at {:?}", self.anchor);
        }
    }

    fn on_exit(&mut self) {
        self.agent.borrow_mut().set_stopped(false);
    }
}
