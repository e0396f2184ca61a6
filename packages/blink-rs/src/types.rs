use serde::{Deserialize, Serialize};

use crate::error::{BlinkError, Result};

/// Raw proximity reading. The sensor delivers 16-bit counts; i32 leaves
/// headroom for the index arithmetic around them.
pub type Sample = i32;

/// Tuning for the detection pipeline.
///
/// Threshold and debounce values are empirically tuned constants,
/// exposed as configuration rather than derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Capacity of the raw-reading history ring (60 s at 604 Hz by default)
    #[serde(default = "default_raw_history_len")]
    pub raw_history_len: usize,

    /// Capacity of the candidate-index ledger
    #[serde(default = "default_ledger_len")]
    pub candidate_ledger_len: usize,

    /// Capacity of the confirmed-blink ledger
    #[serde(default = "default_ledger_len")]
    pub blink_ledger_len: usize,

    /// A reading triggers a candidate when it deviates from the running
    /// mean by more than this multiple of the running standard deviation
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,

    /// Absolute lower bound on the trigger margin, in sensor counts.
    /// Keeps the detector quiet when the baseline variance is near zero.
    #[serde(default = "default_deviation_floor")]
    pub deviation_floor: f64,

    /// Consecutive in-margin samples required before the detector re-arms
    #[serde(default = "default_debounce_samples")]
    pub debounce_samples: u32,

    /// Samples to observe before the detector may trigger at all
    #[serde(default = "default_warmup_samples")]
    pub warmup_samples: u64,

    /// Sum-of-squared-error cutoff below which a window counts as a blink
    #[serde(default = "default_match_cutoff")]
    pub match_cutoff: f64,
}

fn default_raw_history_len() -> usize {
    36_240
}
fn default_ledger_len() -> usize {
    500
}
fn default_threshold_multiplier() -> f64 {
    4.0
}
fn default_deviation_floor() -> f64 {
    15.0
}
fn default_debounce_samples() -> u32 {
    100
}
fn default_warmup_samples() -> u64 {
    50
}
fn default_match_cutoff() -> f64 {
    10.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_history_len: default_raw_history_len(),
            candidate_ledger_len: default_ledger_len(),
            blink_ledger_len: default_ledger_len(),
            threshold_multiplier: default_threshold_multiplier(),
            deviation_floor: default_deviation_floor(),
            debounce_samples: default_debounce_samples(),
            warmup_samples: default_warmup_samples(),
            match_cutoff: default_match_cutoff(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.raw_history_len == 0 {
            return Err(BlinkError::InvalidConfig(
                "raw_history_len must be non-zero".to_string(),
            ));
        }
        if self.candidate_ledger_len == 0 || self.blink_ledger_len == 0 {
            return Err(BlinkError::InvalidConfig(
                "ledger capacities must be non-zero".to_string(),
            ));
        }
        if !self.threshold_multiplier.is_finite() || self.threshold_multiplier <= 0.0 {
            return Err(BlinkError::InvalidConfig(format!(
                "threshold_multiplier must be positive, got {}",
                self.threshold_multiplier
            )));
        }
        if !self.deviation_floor.is_finite() || self.deviation_floor < 0.0 {
            return Err(BlinkError::InvalidConfig(format!(
                "deviation_floor must be non-negative, got {}",
                self.deviation_floor
            )));
        }
        if self.debounce_samples == 0 {
            return Err(BlinkError::InvalidConfig(
                "debounce_samples must be non-zero".to_string(),
            ));
        }
        if !self.match_cutoff.is_finite() || self.match_cutoff <= 0.0 {
            return Err(BlinkError::InvalidConfig(format!(
                "match_cutoff must be positive, got {}",
                self.match_cutoff
            )));
        }
        Ok(())
    }
}

/// A candidate whose surrounding waveform matched the ideal template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Sample index of the excursion peak (center of the matched window)
    pub index: u64,
    /// Sum-of-squared-error score against the template
    pub score: f64,
}

/// Point-in-time view of the running baseline statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub mean: f64,
    pub stdev: f64,
    pub variance: f64,
    /// Total samples accepted since startup
    pub samples_seen: u64,
    /// Samples currently held in the raw history ring
    pub buffered: usize,
}

/// Lifetime counters for a pipeline instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_samples: u64,
    pub total_candidates: u64,
    pub total_blinks: u64,
    /// Windows scored but rejected by the matcher
    pub rejected_windows: u64,
    /// Excursions dropped without classification (insufficient history)
    pub dropped_excursions: u64,
}

/// What a single sample did to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    pub index: u64,
    /// Candidate recorded at this sample, if the detector triggered
    pub candidate: Option<u64>,
    /// Blink confirmed at this sample, if a pending window classified
    pub blink: Option<BlinkEvent>,
    /// Score of a window rejected at this sample, for diagnostics
    pub rejected_score: Option<f64>,
}
