/// Simulation steps per second.
pub const TICRATE: u64 = 35;

/// Tracks level time as a monotonic tic counter.
#[derive(Debug, Clone, Default)]
pub struct LevelClock {
    tic: u64,
}

impl LevelClock {
    /// Create a clock at tic 0.
    pub fn new() -> Self {
        Self { tic: 0 }
    }

    /// Advance the clock by one tic. Returns the new tic number.
    pub fn advance(&mut self) -> u64 {
        self.tic += 1;
        self.tic
    }

    /// Return the current tic number.
    pub fn tic(&self) -> u64 {
        self.tic
    }

    /// Elapsed level time in seconds.
    pub fn seconds(&self) -> f64 {
        self.tic as f64 / TICRATE as f64
    }

    /// Jump to a saved tic.
    pub(crate) fn set_tic(&mut self, tic: u64) {
        self.tic = tic;
    }
}
