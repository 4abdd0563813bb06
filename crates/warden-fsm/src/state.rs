use std::fmt;
use warden_core::Dt;

/// Handle of a state registered with a [`StateMachine`](crate::StateMachine).
///
/// Handles compare by machine and slot, so two states with the same name are
/// still distinct. A handle is only accepted by the machine that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId {
    pub(crate) machine: u64,
    pub(crate) slot: usize,
}

impl StateId {
    pub(crate) fn new(machine: u64, slot: usize) -> Self {
        Self { machine, slot }
    }

    /// The arena slot of the state.
    pub fn index(self) -> usize {
        self.slot
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.slot, self.machine)
    }
}

/// A unit of behaviour the machine can switch to.
///
/// States decide *what* to do while active. *When* to leave them is decided
/// by the transitions registered on the machine, so a state never names
/// another state.
///
/// The machine guarantees that `on_enter` and `on_exit` are balanced: a state
/// is never exited without having been entered, and at most one state is
/// active at a time.
pub trait State: fmt::Debug {
    /// Display name, stable for the lifetime of the state.
    fn name(&self) -> &str;

    /// Called once when the state becomes active, before its first update.
    fn on_enter(&mut self) {}

    /// Called every frame while in this state.
    ///
    /// # Arguments
    ///
    /// * `_dt` - The duration since the last frame.
    fn on_update(&mut self, _dt: Dt) {}

    /// Called every fixed step while in this state.
    ///
    /// # Arguments
    ///
    /// * `_fdt` - The fixed step duration.
    fn on_fixed_update(&mut self, _fdt: Dt) {}

    /// Called once when the state stops being active, before the next state
    /// is entered.
    fn on_exit(&mut self) {}
}
