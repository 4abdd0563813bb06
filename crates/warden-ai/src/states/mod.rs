//! Concrete guard behaviours.
//!
//! Each state owns one small piece of goal-seeking logic against the shared
//! navigation handle. None of them knows when it will be left; that is
//! decided by the transitions registered on the machine.

pub mod attack;
pub mod chase;
pub mod patrol;
pub mod return_to_post;

pub use attack::AttackState;
pub use chase::ChaseState;
pub use patrol::PatrolState;
pub use return_to_post::ReturnState;

use std::fmt;
use std::rc::Rc;
use warden_core::Vec3;

/// Live position of whatever the agent is after.
///
/// Returns `None` while there is no target at all.
#[derive(Clone)]
pub struct Target {
    locate: Rc<dyn Fn() -> Option<Vec3>>,
}

impl Target {
    pub fn new<F>(locate: F) -> Self
    where
        F: Fn() -> Option<Vec3> + 'static,
    {
        Self {
            locate: Rc::new(locate),
        }
    }

    /// A target that never moves.
    pub fn fixed(position: Vec3) -> Self {
        Self::new(move || Some(position))
    }

    pub fn position(&self) -> Option<Vec3> {
        (self.locate)()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&self.position()).finish()
    }
}
