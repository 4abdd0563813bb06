use crate::errors::{FsmError, FsmResult};
use crate::state::{State, StateId};
use crate::transition::{GlobalTransition, Guard, LocalTransition};
use log::{debug, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use warden_core::Dt;

/// Source of machine identities, so handles cannot cross machines.
static NEXT_MACHINE_ID: AtomicU64 = AtomicU64::new(0);

/// The finite state machine driving one agent.
///
/// States are registered once and addressed through [`StateId`] handles.
/// Transitions are evaluated on every [`update`](Self::update): globals in
/// insertion order first, then the locals leaving the active state in
/// insertion order. The first guard that holds wins.
#[derive(Debug)]
pub struct FiniteStateMachine {
    /// Identity stamped into every handle this machine issues.
    id: u64,
    /// Registered states, indexed by [`StateId`].
    states: Vec<Box<dyn State>>,
    /// State passed to `set_initial`.
    initial_state: Option<StateId>,
    /// Current active state.
    current_state: Option<StateId>,
    /// Previously active state.
    previous_state: Option<StateId>,
    /// Transitions that may fire from any state.
    globals: Vec<GlobalTransition>,
    /// Transitions bound to a source state.
    locals: Vec<LocalTransition>,
    /// Sum of the frame times forwarded to the current state.
    time_in_state: Dt,
    /// Whether the transition graph was checked since the last registration.
    validated: bool,
}

impl Default for FiniteStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// The name the rest of the workspace uses for the machine.
pub type StateMachine = FiniteStateMachine;

impl FiniteStateMachine {
    /// Create a new, uninitialized state machine.
    ///
    /// # Returns
    ///
    /// A new [`FiniteStateMachine`] instance.
    pub fn new() -> Self {
        Self {
            id: NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed),
            states: Vec::new(),
            initial_state: None,
            current_state: None,
            previous_state: None,
            globals: Vec::new(),
            locals: Vec::new(),
            time_in_state: Dt::ZERO,
            validated: false,
        }
    }

    /// Register a state with the machine.
    ///
    /// # Arguments
    ///
    /// * `state` - The state to add.
    ///
    /// # Returns
    ///
    /// The handle identifying the state in this machine.
    pub fn add_state(&mut self, state: Box<dyn State>) -> StateId {
        let id = StateId::new(self.id, self.states.len());
        self.states.push(state);
        self.validated = false;
        id
    }

    /// Set the initial state and enter it.
    ///
    /// Must be called exactly once, before the first update.
    ///
    /// # Arguments
    ///
    /// * `id` - The handle of the initial state.
    pub fn set_initial(&mut self, id: StateId) -> FsmResult<()> {
        if self.current_state.is_some() {
            return Err(FsmError::AlreadyInitialized);
        }
        self.ensure_registered(id)?;

        self.initial_state = Some(id);
        self.current_state = Some(id);
        self.time_in_state = Dt::ZERO;
        self.validated = false;

        let state = &mut self.states[id.slot];
        debug!("Entering initial state {}", state.name());
        state.on_enter();

        Ok(())
    }

    /// Add a transition that is only considered while `from` is active.
    ///
    /// # Arguments
    ///
    /// * `from` - The source state.
    /// * `to` - The target state.
    /// * `guard` - The condition under which the transition fires.
    pub fn add_transition<F>(&mut self, from: StateId, to: StateId, guard: F) -> FsmResult<()>
    where
        F: FnMut() -> bool + 'static,
    {
        self.push_local(from, to, Guard::new(guard))
    }

    /// Add a local transition whose guard can fail.
    pub fn add_fallible_transition<F>(
        &mut self,
        from: StateId,
        to: StateId,
        guard: F,
    ) -> FsmResult<()>
    where
        F: FnMut() -> anyhow::Result<bool> + 'static,
    {
        self.push_local(from, to, Guard::fallible(guard))
    }

    /// Add a transition that may fire from any state.
    ///
    /// Globals are checked before every local transition.
    ///
    /// # Arguments
    ///
    /// * `to` - The target state.
    /// * `guard` - The condition under which the transition fires.
    pub fn add_global<F>(&mut self, to: StateId, guard: F) -> FsmResult<()>
    where
        F: FnMut() -> bool + 'static,
    {
        self.push_global(to, Guard::new(guard))
    }

    /// Add a global transition whose guard can fail.
    pub fn add_fallible_global<F>(&mut self, to: StateId, guard: F) -> FsmResult<()>
    where
        F: FnMut() -> anyhow::Result<bool> + 'static,
    {
        self.push_global(to, Guard::fallible(guard))
    }

    fn push_local(&mut self, from: StateId, to: StateId, guard: Guard) -> FsmResult<()> {
        self.ensure_registered(from)?;
        self.ensure_registered(to)?;
        self.locals.push(LocalTransition { from, to, guard });
        self.validated = false;
        Ok(())
    }

    fn push_global(&mut self, to: StateId, guard: Guard) -> FsmResult<()> {
        self.ensure_registered(to)?;
        self.globals.push(GlobalTransition { to, guard });
        self.validated = false;
        Ok(())
    }

    /// Check that every state a transition leaves can actually become active.
    ///
    /// A state is reachable if it is the initial state, the target of a
    /// global transition, or the target of a local transition leaving a
    /// reachable state. Runs automatically on the first update after the
    /// machine was modified.
    pub fn validate(&self) -> FsmResult<()> {
        let initial = self.initial_state.ok_or(FsmError::NotInitialized)?;

        let mut reachable = vec![false; self.states.len()];
        reachable[initial.slot] = true;
        for transition in &self.globals {
            reachable[transition.to.slot] = true;
        }

        let mut changed = true;
        while changed {
            changed = false;
            for transition in &self.locals {
                if reachable[transition.from.slot] && !reachable[transition.to.slot] {
                    reachable[transition.to.slot] = true;
                    changed = true;
                }
            }
        }

        match self.locals.iter().find(|t| !reachable[t.from.slot]) {
            Some(transition) => Err(FsmError::DanglingTransitionTarget {
                state: self.states[transition.from.slot].name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Update the FSM once per frame.
    ///
    /// Transition evaluation happens first; if a transition fires, the old
    /// state is exited and the new one entered before `dt` is forwarded, so
    /// the new state gets this frame's update.
    ///
    /// # Arguments
    ///
    /// * `dt` - The duration since the last update.
    pub fn update(&mut self, dt: Dt) -> FsmResult<()> {
        let current = self.current_state.ok_or(FsmError::NotInitialized)?;

        if !self.validated {
            self.validate()?;
            self.validated = true;
        }

        if let Some(next) = self.find_transition(current)? {
            self.change_state(next);
        }

        let active = self.current_state.unwrap_or(current);
        self.time_in_state += dt;
        self.states[active.slot].on_update(dt);

        Ok(())
    }

    /// Forward a fixed step to the active state.
    ///
    /// Never evaluates transitions.
    ///
    /// # Arguments
    ///
    /// * `fdt` - The fixed step duration.
    pub fn fixed_update(&mut self, fdt: Dt) -> FsmResult<()> {
        let current = self.current_state.ok_or(FsmError::NotInitialized)?;
        self.states[current.slot].on_fixed_update(fdt);
        Ok(())
    }

    fn find_transition(&mut self, current: StateId) -> FsmResult<Option<StateId>> {
        let states = &self.states;
        let guard_failed = |to: StateId, source: anyhow::Error| FsmError::Guard {
            target: states[to.slot].name().to_string(),
            source,
        };

        for transition in self.globals.iter_mut() {
            let fired = transition
                .guard
                .check()
                .map_err(|e| guard_failed(transition.to, e))?;
            if fired {
                trace!("Global transition to {} fired", states[transition.to.slot].name());
                return Ok(Some(transition.to));
            }
        }

        for transition in self.locals.iter_mut().filter(|t| t.from == current) {
            let fired = transition
                .guard
                .check()
                .map_err(|e| guard_failed(transition.to, e))?;
            if fired {
                trace!(
                    "Transition {} -> {} fired",
                    states[transition.from.slot].name(),
                    states[transition.to.slot].name()
                );
                return Ok(Some(transition.to));
            }
        }

        Ok(None)
    }

    fn change_state(&mut self, next: StateId) {
        let Some(current) = self.current_state else {
            return;
        };
        if current == next {
            return;
        }

        self.states[current.slot].on_exit();
        debug!(
            "{} -> {}",
            self.states[current.slot].name(),
            self.states[next.slot].name()
        );

        self.previous_state = Some(current);
        self.current_state = Some(next);
        self.time_in_state = Dt::ZERO;

        self.states[next.slot].on_enter();
    }

    fn owns(&self, id: StateId) -> bool {
        id.machine == self.id && id.slot < self.states.len()
    }

    fn ensure_registered(&self, id: StateId) -> FsmResult<()> {
        if self.owns(id) {
            Ok(())
        } else {
            Err(FsmError::UnknownState(id))
        }
    }

    /// Get the current state Id.
    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    /// Get the display name of the current state, for labels and diagnostics.
    pub fn current_state_name(&self) -> Option<&str> {
        self.current_state.and_then(|id| self.state_name(id))
    }

    /// Get the previous state Id.
    pub fn previous_state(&self) -> Option<StateId> {
        self.previous_state
    }

    /// Time accumulated by updates of the current state since it was entered.
    pub fn time_in_state(&self) -> Dt {
        self.time_in_state
    }

    /// Whether `id` is the active state.
    pub fn is_in(&self, id: StateId) -> bool {
        self.current_state == Some(id)
    }

    /// Read-only access to a registered state.
    pub fn state(&self, id: StateId) -> Option<&dyn State> {
        self.owns(id).then(|| self.states[id.slot].as_ref())
    }

    /// Get the display name of a registered state.
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.owns(id).then(|| self.states[id.slot].name())
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
