use crate::{Quat, Vec3, flatten};
use cgmath::{InnerSpace, One, Rad, Rotation3};

/// Planar speeds below this (squared) are treated as standing still.
const MIN_FACING_SPEED_SQ: f32 = 0.01;

/// Position and orientation of an agent in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The position of the object in 3D space.
    pub pos: Vec3,
    /// The rotation of the object as a quaternion.
    pub rot: Quat,
}

impl Transform {
    /// Creates a new transform with default rotation.
    ///
    /// # Arguments
    ///
    /// * `pos` - The position of the object.
    ///
    /// # Returns
    ///
    /// A new [`Transform`] instance.
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            rot: Quat::one(),
        }
    }

    /// Creates a new transform with a specified rotation.
    pub fn new_with_rot(pos: Vec3, rot: Quat) -> Self {
        Self { pos, rot }
    }

    /// The direction the object is facing (+Z in local space).
    pub fn forward(&self) -> Vec3 {
        self.rot * Vec3::unit_z()
    }

    /// Turns the object around the vertical axis toward `dir`.
    ///
    /// The vertical component of `dir` is ignored. Directions shorter than
    /// 0.1 leave the rotation untouched so that a stationary agent does not
    /// jitter.
    ///
    /// # Arguments
    ///
    /// * `dir` - The direction to face.
    /// * `amount` - Interpolation factor, clamped to `0..=1`.
    ///
    /// # Returns
    ///
    /// `true` if the rotation was changed.
    pub fn turn_towards(&mut self, dir: Vec3, amount: f32) -> bool {
        let planar = flatten(dir);
        if planar.magnitude2() <= MIN_FACING_SPEED_SQ {
            return false;
        }

        let target = yaw_rotation(planar);
        self.rot = self.rot.slerp(target, amount.clamp(0.0, 1.0)).normalize();
        true
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 0.0))
    }
}

/// Rotation about +Y that maps +Z onto the planar direction `dir`.
pub fn yaw_rotation(dir: Vec3) -> Quat {
    Quat::from_angle_y(Rad(dir.x.atan2(dir.z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_default_faces_forward_z() {
        let transform = Transform::default();
        assert!(approx(transform.forward(), Vec3::unit_z()));
    }

    #[test]
    fn test_yaw_rotation_maps_forward() {
        let rot = yaw_rotation(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(rot * Vec3::unit_z(), Vec3::unit_x()));
    }

    #[test]
    fn test_full_turn_reaches_direction() {
        let mut transform = Transform::default();
        assert!(transform.turn_towards(Vec3::new(-3.0, 2.0, 0.0), 1.0));
        assert!(approx(transform.forward(), Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_partial_turn_stays_between() {
        let mut transform = Transform::default();
        transform.turn_towards(Vec3::unit_x(), 0.5);

        let forward = transform.forward();
        assert!(forward.x > 0.1 && forward.z > 0.1);
    }

    #[test]
    fn test_slow_direction_is_ignored() {
        let mut transform = Transform::default();
        assert!(!transform.turn_towards(Vec3::new(0.05, 0.0, 0.05), 1.0));
        assert_eq!(transform.rot, Quat::one());
    }
}
