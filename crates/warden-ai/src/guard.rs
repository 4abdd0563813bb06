//! A sentry assembled from the four guard behaviours.

use crate::clock::Clock;
use crate::nav::{NavAgent, NavQuery};
use crate::perception::Perception;
use crate::states::{AttackState, ChaseState, PatrolState, ReturnState, Target};
use log::debug;
use std::rc::Rc;
use warden_core::{Dt, GuardConfig, Shared, Signal, Transform, Vec3, planar_distance};
use warden_fsm::{FsmResult, StateId, StateMachine};

/// Handles of the states registered by [`GuardAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardStates {
    pub patrol: StateId,
    pub chase: StateId,
    pub attack: StateId,
    pub ret: StateId,
}

/// Patrols around a post, chases what it sees, strikes what it reaches and
/// walks back once the target has been out of sight for a while.
///
/// The agent is the only writer of the perception flag and the last-seen
/// time. Both are refreshed at the start of every [`GuardAgent::update`],
/// before any transition guard reads them.
#[derive(Debug)]
pub struct GuardAgent<C: Clock> {
    fsm: StateMachine,
    clock: C,
    can_see: Signal<bool>,
    last_seen: Signal<Option<Dt>>,
    now: Signal<Dt>,
    states: GuardStates,
    arrived: Signal<bool>,
    strikes: Signal<u32>,
}

impl<C: Clock> GuardAgent<C> {
    /// Builds the guard and its state machine.
    ///
    /// # Arguments
    ///
    /// * `agent` - Movement handle of the guard.
    /// * `body` - The guard's transform.
    /// * `query` - Walkable-area queries for patrol points.
    /// * `post` - Where the guard patrols and returns to; its spawn point when `None`.
    /// * `target` - Whoever the guard is watching for.
    /// * `clock` - Time source for the lose-sight timeout.
    /// * `config` - Tuning values.
    ///
    /// # Returns
    ///
    /// The assembled guard, already patrolling.
    pub fn new<A, Q>(
        agent: Shared<A>,
        body: Shared<Transform>,
        query: Rc<Q>,
        post: Option<Vec3>,
        target: Target,
        clock: C,
        config: &GuardConfig,
    ) -> FsmResult<Self>
    where
        A: NavAgent + 'static,
        Q: NavQuery + 'static,
    {
        let post = post.or_else(|| Some(body.borrow().pos));

        let patrol = PatrolState::new(
            agent.clone(),
            body.clone(),
            query,
            post,
            config.patrol_radius,
            config.wait_at_point,
        )
        .with_config(config);
        let chase = ChaseState::new(agent.clone(), body.clone(), target.clone())
            .with_turn_rate(config.turn_rate);
        let attack = AttackState::new(
            agent.clone(),
            body.clone(),
            post,
            config.attack_range,
            config.strike_interval,
            target.clone(),
        )
        .with_turn_rate(config.turn_rate);
        let ret = ReturnState::new(agent, body.clone(), post)
            .with_arrive_tolerance(config.arrive_tolerance);

        let arrived = ret.arrived();
        let strikes = attack.strikes();

        let mut fsm = StateMachine::new();
        let states = GuardStates {
            patrol: fsm.add_state(Box::new(patrol)),
            chase: fsm.add_state(Box::new(chase)),
            attack: fsm.add_state(Box::new(attack)),
            ret: fsm.add_state(Box::new(ret)),
        };
        fsm.set_initial(states.patrol)?;

        let can_see = Signal::new(false);
        let last_seen = Signal::new(None);
        let now = Signal::new(clock.elapsed());

        // Attack is registered first so that it wins over the chase global.
        {
            let can_see = can_see.clone();
            let range = config.attack_range;
            fsm.add_global(states.attack, move || {
                can_see.get()
                    && target
                        .position()
                        .is_some_and(|at| planar_distance(body.borrow().pos, at) <= range)
            })?;
        }
        {
            let can_see = can_see.clone();
            fsm.add_global(states.chase, move || can_see.get())?;
        }
        {
            let can_see = can_see.clone();
            fsm.add_transition(states.patrol, states.chase, move || can_see.get())?;
        }
        for from in [states.chase, states.attack] {
            let last_seen = last_seen.clone();
            let now = now.clone();
            let lose_sight_after = config.lose_sight_after;
            fsm.add_transition(from, states.ret, move || {
                last_seen
                    .get()
                    .is_none_or(|seen| now.get().saturating_sub(seen) > lose_sight_after)
            })?;
        }
        {
            let arrived = arrived.clone();
            fsm.add_transition(states.ret, states.patrol, move || arrived.get())?;
        }

        Ok(Self {
            fsm,
            clock,
            can_see,
            last_seen,
            now,
            states,
            arrived,
            strikes,
        })
    }

    /// Refreshes perception and ticks the machine.
    ///
    /// # Arguments
    ///
    /// * `dt` - The duration since the last frame.
    /// * `perception` - Whether the target is visible this frame.
    pub fn update<P: Perception + ?Sized>(&mut self, dt: Dt, perception: &P) -> FsmResult<()> {
        let now = self.clock.elapsed();
        let visible = perception.can_see_target();

        self.now.set(now);
        if visible != self.can_see.get() {
            debug!("Target {}", if visible { "spotted" } else { "lost from view" });
        }
        self.can_see.set(visible);
        if visible {
            self.last_seen.set(Some(now));
        }

        self.fsm.update(dt)
    }

    /// Forwards a fixed step to the active behaviour.
    pub fn fixed_update(&mut self, fdt: Dt) -> FsmResult<()> {
        self.fsm.fixed_update(fdt)
    }

    /// Name of the active behaviour.
    pub fn state_name(&self) -> Option<&str> {
        self.fsm.current_state_name()
    }

    pub fn states(&self) -> GuardStates {
        self.states
    }

    pub fn machine(&self) -> &StateMachine {
        &self.fsm
    }

    /// Clock time the target was last visible.
    pub fn last_seen(&self) -> Option<Dt> {
        self.last_seen.get()
    }

    /// Whether the guard got back to its post since it last left it.
    pub fn is_back_at_post(&self) -> bool {
        self.arrived.get()
    }

    /// Strikes landed so far.
    pub fn strikes(&self) -> u32 {
        self.strikes.get()
    }
}
