use std::time::Instant;
use warden_core::{Dt, Signal};

/// Monotonic source of elapsed time.
pub trait Clock {
    /// Time elapsed since the clock started.
    fn elapsed(&self) -> Dt;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Dt {
        self.start.elapsed()
    }
}

/// Clock advanced explicitly by the frame driver.
///
/// Clones share the same time, so a simulation loop can keep one handle and
/// give another to the agent.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Signal<Dt>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `dt`.
    pub fn advance(&self, dt: Dt) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Dt {
        self.now.get()
    }
}
