// Incremental moment tracking over the live contents of a ring buffer
//
// Every update is O(1): while the buffer grows, the new reading is folded
// into the running average; once the buffer is full, the evicted reading
// is subtracted and the new one added. The buffer is never rescanned.

/// Running mean of `x^power` over the samples currently buffered.
///
/// The same growing/steady-state arithmetic serves both the first moment
/// (mean) and the second (mean of squares).
#[derive(Debug, Clone)]
pub struct MomentTracker {
    power: i32,
    value: f64,
}

impl MomentTracker {
    pub fn new(power: i32) -> Self {
        Self { power, value: 0.0 }
    }

    /// Fold one push into the running moment.
    ///
    /// `occupancy` is the buffer's size after the push; `evicted` is the
    /// reading the push displaced, if the buffer was already full.
    pub fn update(&mut self, new: f64, evicted: Option<f64>, occupancy: usize) {
        let n = occupancy as f64;
        match evicted {
            Some(old) => {
                // Steady state: occupancy stays at capacity
                self.value += new.powi(self.power) / n - old.powi(self.power) / n;
            }
            None => {
                // Growing phase, including the very first sample (n == 1)
                self.value = ((n - 1.0) * self.value + new.powi(self.power)) / n;
            }
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Mean, mean-of-squares and derived variance/stdev of the readings
/// currently held in the raw history ring.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    first: MomentTracker,
    second: MomentTracker,
    count: usize,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            first: MomentTracker::new(1),
            second: MomentTracker::new(2),
            count: 0,
        }
    }

    /// Update both moments for a push. `occupancy` is the ring size after
    /// the push, `evicted` the displaced reading if the ring was full.
    pub fn update(&mut self, new: f64, evicted: Option<f64>, occupancy: usize) {
        self.first.update(new, evicted, occupancy);
        self.second.update(new, evicted, occupancy);
        self.count = occupancy;
    }

    pub fn mean(&self) -> f64 {
        self.first.value()
    }

    pub fn mean_square(&self) -> f64 {
        self.second.value()
    }

    /// Population variance, clamped at zero: the subtract-then-add updates
    /// can leave `mean_square - mean^2` fractionally negative.
    pub fn variance(&self) -> f64 {
        (self.mean_square() - self.mean() * self.mean()).max(0.0)
    }

    pub fn stdev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
