//! Finite state machine runtime for frame-driven agents.
//!
//! A [`StateMachine`] holds one active [`State`] at a time. Every frame the
//! driver calls [`StateMachine::update`], which evaluates the guarded
//! transitions (global ones first, then the local ones leaving the active
//! state), switches state if one fires and finally forwards the frame to the
//! active state. [`StateMachine::fixed_update`] only forwards the fixed step.
//!
//! ```
//! use warden_core::Dt;
//! use warden_fsm::{State, StateMachine};
//!
//! #[derive(Debug)]
//! struct Idle;
//! impl State for Idle {
//!     fn name(&self) -> &str {
//!         "Idle"
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Alert;
//! impl State for Alert {
//!     fn name(&self) -> &str {
//!         "Alert"
//!     }
//! }
//!
//! let mut fsm = StateMachine::new();
//! let idle = fsm.add_state(Box::new(Idle));
//! let alert = fsm.add_state(Box::new(Alert));
//! fsm.set_initial(idle).unwrap();
//! fsm.add_transition(idle, alert, || true).unwrap();
//!
//! fsm.update(Dt::from_millis(16)).unwrap();
//! assert_eq!(fsm.current_state_name(), Some("Alert"));
//! ```

#![forbid(unsafe_code)]

pub mod errors;
pub mod machine;
pub mod state;
pub mod transition;

pub use errors::{FsmError, FsmResult};
pub use machine::StateMachine;
pub use state::{State, StateId};
pub use transition::{GlobalTransition, Guard, LocalTransition};
