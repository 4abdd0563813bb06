//! Sight checks feeding the guard's transition guards.

use cgmath::{Deg, InnerSpace};
use warden_core::{GuardConfig, Transform, Vec3};

/// Source of the per-frame "target visible" fact.
pub trait Perception {
    fn can_see_target(&self) -> bool;
}

/// Occlusion query between two points.
pub trait LineOfSight {
    /// Whether an obstacle lies on the segment from `from` to `to`.
    fn is_blocked(&self, from: Vec3, to: Vec3) -> bool;
}

impl Perception for bool {
    fn can_see_target(&self) -> bool {
        *self
    }
}

/// Cone-shaped field of view with occlusion.
///
/// The target is visible when it is within `view_radius`, within half of
/// `view_angle` of the observer's forward direction, and nothing blocks the
/// line between both eye points. [`update`](Self::update) caches the result
/// for the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOfView {
    pub view_radius: f32,
    /// Full opening angle, in degrees.
    pub view_angle: f32,
    pub eye_height: f32,
    can_see: bool,
}

impl FieldOfView {
    pub fn new(view_radius: f32, view_angle: f32) -> Self {
        Self {
            view_radius,
            view_angle,
            eye_height: 1.6,
            can_see: false,
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            view_radius: config.view_radius,
            view_angle: config.view_angle,
            eye_height: config.eye_height,
            can_see: false,
        }
    }

    /// Checks whether `observer` can see a target standing at `target`.
    pub fn sees<L: LineOfSight + ?Sized>(&self, observer: &Transform, target: Vec3, los: &L) -> bool {
        let lift = Vec3::new(0.0, self.eye_height, 0.0);
        let eye = observer.pos + lift;
        let target_eye = target + lift;

        let to_target = target_eye - eye;
        if to_target.magnitude2() > self.view_radius * self.view_radius {
            return false;
        }

        if to_target.magnitude2() > f32::EPSILON {
            let angle: Deg<f32> = observer.forward().angle(to_target).into();
            if angle.0 > self.view_angle * 0.5 {
                return false;
            }
        }

        !los.is_blocked(eye, target_eye)
    }

    /// Refreshes the cached visibility for this frame.
    ///
    /// # Arguments
    ///
    /// * `observer` - The watching agent.
    /// * `target` - Where the target stands, if there is one.
    /// * `los` - Occlusion query.
    pub fn update<L: LineOfSight + ?Sized>(
        &mut self,
        observer: &Transform,
        target: Option<Vec3>,
        los: &L,
    ) {
        self.can_see = target.is_some_and(|target| self.sees(observer, target, los));
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::from_config(&GuardConfig::default())
    }
}

impl Perception for FieldOfView {
    fn can_see_target(&self) -> bool {
        self.can_see
    }
}
