// Candidate detection over the running baseline
//
// Flags a sample as a possible blink onset when it deviates from the
// current mean by more than a statistically derived margin, then stays
// quiet until the signal has sat back inside the margin long enough.

/// Detector phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Baseline tracking, armed to trigger
    Idle,
    /// An excursion is in progress, further triggers suppressed
    Triggered,
}

/// Largest deviation seen during the current (or most recent) excursion.
#[derive(Debug, Clone, Copy)]
pub struct ExcursionPeak {
    pub index: u64,
    pub deviation: f64,
}

/// Thresholding state machine with debounce.
///
/// The trigger margin is `max(multiplier * stdev, floor)`: the absolute
/// floor keeps the detector from firing on noise when the baseline
/// variance is near zero (a freshly started or very flat stream).
#[derive(Debug, Clone)]
pub struct CandidateDetector {
    multiplier: f64,
    floor: f64,
    debounce: u32,
    warmup: u64,

    state: DetectorState,
    samples_seen: u64,
    in_margin_run: u32,
    peak: Option<ExcursionPeak>,
}

impl CandidateDetector {
    pub fn new(multiplier: f64, floor: f64, debounce: u32, warmup: u64) -> Self {
        Self {
            multiplier,
            floor,
            debounce,
            warmup,
            state: DetectorState::Idle,
            samples_seen: 0,
            in_margin_run: 0,
            peak: None,
        }
    }

    /// Evaluate one reading against the current baseline. Returns the
    /// sample index when this reading triggers a new candidate.
    pub fn evaluate(&mut self, index: u64, value: f64, mean: f64, stdev: f64) -> Option<u64> {
        self.samples_seen += 1;

        let margin = (self.multiplier * stdev).max(self.floor);
        let deviation = (value - mean).abs();

        match self.state {
            DetectorState::Idle => {
                if self.samples_seen <= self.warmup {
                    return None;
                }
                if deviation > margin {
                    self.state = DetectorState::Triggered;
                    self.in_margin_run = 0;
                    self.peak = Some(ExcursionPeak { index, deviation });
                    return Some(index);
                }
                None
            }
            DetectorState::Triggered => {
                if let Some(peak) = self.peak.as_mut() {
                    if deviation > peak.deviation {
                        peak.index = index;
                        peak.deviation = deviation;
                    }
                }
                if deviation <= margin {
                    self.in_margin_run += 1;
                    if self.in_margin_run >= self.debounce {
                        self.state = DetectorState::Idle;
                        self.in_margin_run = 0;
                    }
                } else {
                    self.in_margin_run = 0;
                }
                None
            }
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Peak of the current excursion. Retained after re-arming so a
    /// classification window that straddles the excursion end can still
    /// be placed; cleared only when a new excursion begins.
    pub fn peak(&self) -> Option<ExcursionPeak> {
        self.peak
    }
}
