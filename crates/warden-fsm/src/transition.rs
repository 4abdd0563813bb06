use crate::state::StateId;
use std::fmt;

type GuardFn = Box<dyn FnMut() -> anyhow::Result<bool>>;

/// A zero-argument predicate deciding whether a transition fires.
///
/// Guards usually read signals the agent writes once per frame. They may have
/// side effects; the machine calls each guard at most once per update and
/// stops at the first one that holds.
pub struct Guard {
    check: GuardFn,
}

impl Guard {
    /// Creates a guard from an infallible predicate.
    pub fn new<F>(mut predicate: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        Self {
            check: Box::new(move || Ok(predicate())),
        }
    }

    /// Creates a guard whose evaluation can fail.
    ///
    /// An error aborts the current update and is returned to its caller.
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: FnMut() -> anyhow::Result<bool> + 'static,
    {
        Self {
            check: Box::new(predicate),
        }
    }

    /// Evaluates the guard.
    pub fn check(&mut self) -> anyhow::Result<bool> {
        (self.check)()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// A transition considered only while `from` is the active state.
#[derive(Debug)]
pub struct LocalTransition {
    pub from: StateId,
    pub to: StateId,
    pub guard: Guard,
}

/// A transition considered on every update, ahead of all local ones.
#[derive(Debug)]
pub struct GlobalTransition {
    pub to: StateId,
    pub guard: Guard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infallible_guard() {
        let mut calls = 0;
        let mut guard = Guard::new(move || {
            calls += 1;
            calls > 1
        });

        assert!(!guard.check().unwrap());
        assert!(guard.check().unwrap());
    }

    #[test]
    fn test_fallible_guard_reports_error() {
        let mut guard = Guard::fallible(|| anyhow::bail!("sensor offline"));
        let err = guard.check().unwrap_err();
        assert_eq!(err.to_string(), "sensor offline");
    }
}
