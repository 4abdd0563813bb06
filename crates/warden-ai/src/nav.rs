use std::fmt::Debug;
use warden_core::Vec3;

/// Movement handle of an agent.
///
/// Mirrors what a navigation-mesh agent offers: a destination to path
/// towards, progress queries, and a brake. Implementations move the agent's
/// [`Transform`](warden_core::Transform) themselves.
pub trait NavAgent: Debug {
    /// Starts moving towards `point`.
    ///
    /// # Returns
    ///
    /// `false` if no path to `point` exists. The agent then keeps its
    /// previous orders.
    fn set_destination(&mut self, point: Vec3) -> bool;

    /// Whether a path is still being computed.
    fn is_path_pending(&self) -> bool;

    /// Distance left along the current path.
    fn remaining_distance(&self) -> f32;

    /// Distance from the destination at which the agent stops.
    fn stopping_distance(&self) -> f32;

    /// Current velocity.
    fn velocity(&self) -> Vec3;

    fn is_stopped(&self) -> bool;

    fn set_stopped(&mut self, stopped: bool);
}

/// Spatial queries against the walkable area.
pub trait NavQuery: Debug {
    /// Finds the closest walkable point within `max_distance` of `near`.
    fn sample_position(&self, near: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Whether the agent reached its destination.
///
/// True once no path is pending and the remaining distance is within the
/// stopping distance plus `tolerance`.
pub fn has_arrived<A: NavAgent + ?Sized>(agent: &A, tolerance: f32) -> bool {
    !agent.is_path_pending() && agent.remaining_distance() <= agent.stopping_distance() + tolerance
}


#[cfg(test)]
mod tests {
    use super::mock::MockAgent;
    use super::*;

    #[test]
    fn test_arrived_within_tolerance() {
        let mut agent = MockAgent::travelling(0.54);
        agent.stopping = 0.5;
        assert!(has_arrived(&agent, 0.05));

        agent.remaining = 0.56;
        assert!(!has_arrived(&agent, 0.05));
    }

    #[test]
    fn test_pending_path_is_not_arrived() {
        let mut agent = MockAgent::arrived();
        agent.pending = true;
        assert!(!has_arrived(&agent, 0.05));
    }
}
