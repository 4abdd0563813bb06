use crate::Dt;

/// Tuning values for a guard agent.
///
/// Defaults match a guard on a ~6 m patrol beat.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardConfig {
    /// Radius around the post in which patrol points are sampled.
    pub patrol_radius: f32,
    /// How long to wait at a patrol point before picking the next one.
    pub wait_at_point: Dt,
    /// How long the target may stay unseen before the guard gives up the chase.
    pub lose_sight_after: Dt,
    /// Distance at which the guard stops to engage.
    pub attack_range: f32,
    /// Time between two strikes while engaging.
    pub strike_interval: Dt,
    /// Maximum distance of the field of view.
    pub view_radius: f32,
    /// Full opening angle of the field of view, in degrees.
    pub view_angle: f32,
    /// Height of the eyes above the agent's origin.
    pub eye_height: f32,
    /// Facing interpolation rate, multiplied by the frame time.
    pub turn_rate: f32,
    /// Slack added to the stopping distance when testing for arrival.
    pub arrive_tolerance: f32,
    /// Number of random patrol points tried before falling back to the post.
    pub sample_attempts: usize,
    /// Maximum distance a sampled point may be moved onto walkable ground.
    pub sample_max_distance: f32,
    /// Seed for patrol point selection; entropy from the OS when `None`.
    pub patrol_seed: Option<u64>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            patrol_radius: 6.0,
            wait_at_point: Dt::from_millis(1200),
            lose_sight_after: Dt::from_secs(2),
            attack_range: 1.8,
            strike_interval: Dt::from_secs(1),
            view_radius: 10.0,
            view_angle: 90.0,
            eye_height: 1.6,
            turn_rate: 8.0,
            arrive_tolerance: 0.05,
            sample_attempts: 10,
            sample_max_distance: 1.5,
            patrol_seed: None,
        }
    }
}

impl GuardConfig {
    pub fn with_patrol_radius(mut self, radius: f32) -> Self {
        self.patrol_radius = radius;
        self
    }

    pub fn with_wait_at_point(mut self, wait: Dt) -> Self {
        self.wait_at_point = wait;
        self
    }

    pub fn with_lose_sight_after(mut self, after: Dt) -> Self {
        self.lose_sight_after = after;
        self
    }

    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    pub fn with_strike_interval(mut self, interval: Dt) -> Self {
        self.strike_interval = interval;
        self
    }

    pub fn with_patrol_seed(mut self, seed: u64) -> Self {
        self.patrol_seed = Some(seed);
        self
    }

    /// Sets the field of view.
    ///
    /// # Arguments
    ///
    /// * `radius` - Maximum sight distance.
    /// * `angle` - Full opening angle in degrees, clamped to `0..=360`.
    pub fn with_view(mut self, radius: f32, angle: f32) -> Self {
        self.view_radius = radius;
        self.view_angle = angle.clamp(0.0, 360.0);
        self
    }
}
