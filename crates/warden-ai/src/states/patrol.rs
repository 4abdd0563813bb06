use crate::nav::{NavAgent, NavQuery, has_arrived};
use log::{trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::rc::Rc;
use warden_core::{Dt, GuardConfig, Shared, Transform, Vec3};
use warden_fsm::State;

/// Wanders between random points around a post, waiting a moment at each.
#[derive(Debug)]
pub struct PatrolState<A: NavAgent, Q: NavQuery> {
    agent: Shared<A>,
    body: Shared<Transform>,
    query: Rc<Q>,
    post: Option<Vec3>,
    radius: f32,
    dwell_time: Dt,
    timer: Dt,
    sample_attempts: usize,
    sample_max_distance: f32,
    arrive_tolerance: f32,
    rng: StdRng,
}

impl<A: NavAgent, Q: NavQuery> PatrolState<A, Q> {
    /// Creates a new patrol state.
    ///
    /// # Arguments
    ///
    /// * `agent` - Movement handle of the guard.
    /// * `body` - The guard's transform.
    /// * `query` - Walkable-area queries used to validate patrol points.
    /// * `post` - Center of the patrol area; the guard's position when `None`.
    /// * `radius` - Radius of the patrol area.
    /// * `dwell_time` - How long to wait at each point.
    ///
    /// # Returns
    ///
    /// A new [`PatrolState`] instance.
    pub fn new(
        agent: Shared<A>,
        body: Shared<Transform>,
        query: Rc<Q>,
        post: Option<Vec3>,
        radius: f32,
        dwell_time: Dt,
    ) -> Self {
        let defaults = GuardConfig::default();
        Self {
            agent,
            body,
            query,
            post,
            radius,
            dwell_time,
            timer: Dt::ZERO,
            sample_attempts: defaults.sample_attempts,
            sample_max_distance: defaults.sample_max_distance,
            arrive_tolerance: defaults.arrive_tolerance,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Applies the sampling, arrival and seeding settings of `config`.
    pub fn with_config(mut self, config: &GuardConfig) -> Self {
        self.sample_attempts = config.sample_attempts;
        self.sample_max_distance = config.sample_max_distance;
        self.arrive_tolerance = config.arrive_tolerance;
        match config.patrol_seed {
            Some(seed) => self.with_seed(seed),
            None => self,
        }
    }

    /// Makes point selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Time spent waiting at the current point.
    pub fn timer(&self) -> Dt {
        self.timer
    }

    fn center(&self) -> Vec3 {
        self.post.unwrap_or_else(|| self.body.borrow().pos)
    }

    /// Sends the agent to a random walkable point around the post.
    fn set_new_point(&mut self) {
        let center = self.center();
        let mut agent = self.agent.borrow_mut();

        for _ in 0..self.sample_attempts {
            let angle = self.rng.random_range(0.0..TAU);
            let distance = self.radius * self.rng.random::<f32>().sqrt();
            let candidate = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;

            if let Some(hit) = self.query.sample_position(candidate, self.sample_max_distance)
                && agent.set_destination(hit)
            {
                trace!("Patrolling to {hit:?}");
                return;
            }
        }

        warn!("No walkable patrol point found, holding the post");
        if !agent.set_destination(center) {
            warn!("Post at {center:?} is unreachable");
        }
    }
}

impl<A: NavAgent, Q: NavQuery> State for PatrolState<A, Q> {
    fn name(&self) -> &str {
        "Patrol"
    }

    fn on_enter(&mut self) {
        self.timer = Dt::ZERO;
        self.set_new_point();
        self.agent.borrow_mut().set_stopped(false);
    }

    fn on_update(&mut self, dt: Dt) {
        if !has_arrived(&*self.agent.borrow(), self.arrive_tolerance) {
            return;
        }

        self.timer += dt;
        if self.timer >= self.dwell_time {
            self.timer = Dt::ZERO;
            self.set_new_point();
        }
    }
}
