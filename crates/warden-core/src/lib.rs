//! Core functionalities shared by the warden crates.

#![forbid(unsafe_code)]

pub mod config;
pub mod signal;
pub mod transform;

use std::cell::RefCell;
use std::rc::Rc;

pub use config::GuardConfig;
pub use signal::Signal;
pub use transform::Transform;

/// Type alias for a duration which can be used to represent time intervals.
pub type Dt = std::time::Duration;

/// World-space vector.
pub type Vec3 = cgmath::Vector3<f32>;

/// World-space rotation.
pub type Quat = cgmath::Quaternion<f32>;

/// A collaborator shared by every state of one agent.
///
/// Agents are driven from a single thread, so plain reference counting with
/// interior mutability is enough.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value into a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Drops the vertical component of a vector.
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points measured on the ground plane.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    use cgmath::InnerSpace;

    flatten(b - a).magnitude()
}
