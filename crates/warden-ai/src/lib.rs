//! Guard behaviours built on the warden state machine.
//!
//! The concrete states ([`PatrolState`], [`ChaseState`], [`AttackState`],
//! [`ReturnState`]) talk to the world only through the collaborator traits in
//! [`nav`], [`perception`] and [`clock`]. [`GuardAgent`] wires them into a
//! machine the way a sentry is usually set up.

#![forbid(unsafe_code)]

pub mod clock;
pub mod grid;
pub mod guard;
pub mod nav;
pub mod perception;
pub mod states;

pub use clock::{Clock, ManualClock, SystemClock};
pub use grid::{GridAgent, NavGrid};
pub use guard::{GuardAgent, GuardStates};
pub use nav::{NavAgent, NavQuery, has_arrived};
pub use perception::{FieldOfView, LineOfSight, Perception};
pub use states::{AttackState, ChaseState, PatrolState, ReturnState, Target};
