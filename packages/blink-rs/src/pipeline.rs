// Per-sample detection pipeline
//
// Drives each accepted reading synchronously through the raw history
// ring, the incremental statistics, the candidate detector and, once
// enough trailing samples exist, the waveform matcher. Everything runs
// in O(1) time and O(1) additional memory per sample; nothing here ever
// rescans the buffered history.

use std::collections::VecDeque;

use crate::detector::CandidateDetector;
use crate::error::{BlinkError, Result};
use crate::ledger::EventLedger;
use crate::matcher::{MatchOutcome, WaveformMatcher};
use crate::ring::RingBuffer;
use crate::stats::StatsTracker;
use crate::template::Template;
use crate::types::{BaselineSnapshot, BlinkEvent, PipelineConfig, PipelineStats, Sample, SampleOutcome};

/// An excursion waiting for enough trailing samples to classify.
///
/// The candidate field is the triggering index (what the ledger records);
/// the window is centered on the excursion's deviation peak, which for a
/// blink-shaped excursion coincides with the template maximum.
#[derive(Debug, Clone, Copy)]
struct PendingExcursion {
    candidate: u64,
    peak_index: u64,
}

/// Single-stream blink detection pipeline.
pub struct BlinkPipeline {
    config: PipelineConfig,
    raw: RingBuffer<Sample>,
    stats: StatsTracker,
    detector: CandidateDetector,
    matcher: WaveformMatcher,
    ledger: EventLedger,
    pending: VecDeque<PendingExcursion>,
    next_index: u64,
    counters: PipelineStats,
}

impl BlinkPipeline {
    /// Build a pipeline using the canonical blink template.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_template(config, Template::ideal())
    }

    pub fn with_template(config: PipelineConfig, template: Template) -> Result<Self> {
        config.validate()?;
        if config.raw_history_len < template.len() {
            return Err(BlinkError::InvalidConfig(format!(
                "raw_history_len ({}) must cover at least one match window ({})",
                config.raw_history_len,
                template.len()
            )));
        }

        let matcher = WaveformMatcher::new(template, config.match_cutoff)?;
        Ok(Self {
            raw: RingBuffer::new(config.raw_history_len),
            stats: StatsTracker::new(),
            detector: CandidateDetector::new(
                config.threshold_multiplier,
                config.deviation_floor,
                config.debounce_samples,
                config.warmup_samples,
            ),
            ledger: EventLedger::new(config.candidate_ledger_len, config.blink_ledger_len),
            matcher,
            pending: VecDeque::new(),
            next_index: 0,
            counters: PipelineStats::default(),
            config,
        })
    }

    /// Drive one reading through the full pipeline.
    pub fn process_sample(&mut self, reading: Sample) -> SampleOutcome {
        let index = self.next_index;
        self.next_index += 1;
        self.counters.total_samples += 1;

        // Baseline as it stood before this reading: while the ring is
        // still growing, a single spike folded into the stats would
        // inflate the very margin it is tested against.
        let mean = self.stats.mean();
        let stdev = self.stats.stdev();

        let evicted = self.raw.push(reading);
        self.stats
            .update(reading as f64, evicted.map(|v| v as f64), self.raw.len());

        let mut outcome = SampleOutcome {
            index,
            ..Default::default()
        };

        if let Some(candidate) = self.detector.evaluate(index, reading as f64, mean, stdev) {
            log::debug!("candidate at sample {} (mean {:.2}, stdev {:.2})", candidate, mean, stdev);
            self.ledger.record_candidate(candidate);
            self.counters.total_candidates += 1;
            self.pending.push_back(PendingExcursion {
                candidate,
                peak_index: candidate,
            });
            outcome.candidate = Some(candidate);
        }

        // The detector keeps refining the peak while the excursion runs;
        // only the most recent pending excursion can still be moving.
        if let (Some(peak), Some(pending)) = (self.detector.peak(), self.pending.back_mut()) {
            if peak.index >= pending.candidate {
                pending.peak_index = peak.index;
            }
        }

        self.classify_due(index, &mut outcome);
        outcome
    }

    /// Classify any pending excursion whose window is now complete: the
    /// peak has stood for half a window of trailing samples.
    fn classify_due(&mut self, index: u64, outcome: &mut SampleOutcome) {
        let half = self.matcher.half_window() as u64;

        while let Some(pending) = self.pending.front().copied() {
            if index < pending.peak_index + half {
                break;
            }
            self.pending.pop_front();

            match self.extract_window(index, pending.peak_index) {
                Some(window) => match self.matcher.classify(&window) {
                    MatchOutcome::Matched { score } => {
                        let event = BlinkEvent {
                            index: pending.peak_index,
                            score,
                        };
                        log::info!(
                            "blink confirmed at sample {} (candidate {}, score {:.4})",
                            event.index,
                            pending.candidate,
                            score
                        );
                        self.ledger.record_blink(event.clone());
                        self.counters.total_blinks += 1;
                        outcome.blink = Some(event);
                    }
                    MatchOutcome::Rejected { score } => {
                        log::debug!(
                            "candidate {} rejected (peak {}, score {:.4})",
                            pending.candidate,
                            pending.peak_index,
                            score
                        );
                        self.counters.rejected_windows += 1;
                        outcome.rejected_score = Some(score);
                    }
                },
                None => {
                    log::warn!(
                        "dropping excursion at sample {}: insufficient history for a window",
                        pending.candidate
                    );
                    self.counters.dropped_excursions += 1;
                }
            }
        }
    }

    /// Pull the window centered on `peak` out of the raw history. Returns
    /// None when the stream started too recently to cover the leading
    /// half of the window.
    fn extract_window(&self, index: u64, peak: u64) -> Option<Vec<Sample>> {
        let len = self.matcher.window_len();
        let half = self.matcher.half_window() as u64;
        if peak < half {
            return None;
        }
        let start = peak - half;

        let mut window = Vec::with_capacity(len);
        for k in 0..len as u64 {
            let age = (index - (start + k)) as usize;
            window.push(*self.raw.get(age)?);
        }
        Some(window)
    }

    /// Current baseline statistics, for the reporting collaborator.
    pub fn baseline(&self) -> BaselineSnapshot {
        BaselineSnapshot {
            mean: self.stats.mean(),
            stdev: self.stats.stdev(),
            variance: self.stats.variance(),
            samples_seen: self.next_index,
            buffered: self.raw.len(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.counters
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn samples_seen(&self) -> u64 {
        self.next_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            raw_history_len: 2000,
            warmup_samples: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_history_shorter_than_window_rejected() {
        let config = PipelineConfig {
            raw_history_len: 100,
            ..Default::default()
        };
        assert!(BlinkPipeline::new(config).is_err());
    }

    #[test]
    fn test_quiet_stream_produces_no_events() {
        let mut pipeline = BlinkPipeline::new(test_config()).unwrap();
        for _ in 0..5000 {
            let outcome = pipeline.process_sample(100);
            assert!(outcome.candidate.is_none());
            assert!(outcome.blink.is_none());
        }
        assert_eq!(pipeline.stats().total_candidates, 0);
        assert_eq!(pipeline.stats().total_blinks, 0);
        let baseline = pipeline.baseline();
        assert!((baseline.mean - 100.0).abs() < 1e-9);
        assert!(baseline.stdev < 1e-6);
    }

    #[test]
    fn test_square_pulse_candidate_without_blink() {
        // A square excursion triggers a candidate but has the wrong shape
        // for the matcher.
        let mut pipeline = BlinkPipeline::new(test_config()).unwrap();
        for _ in 0..500 {
            pipeline.process_sample(100);
        }
        for _ in 0..30 {
            pipeline.process_sample(800);
        }
        for _ in 0..500 {
            pipeline.process_sample(100);
        }
        assert_eq!(pipeline.stats().total_candidates, 1);
        assert_eq!(pipeline.stats().total_blinks, 0);
        assert_eq!(pipeline.stats().rejected_windows, 1);
    }

    #[test]
    fn test_excursion_near_stream_start_is_dropped() {
        // The peak lands before half a window of history exists, so the
        // excursion cannot be classified.
        let config = PipelineConfig {
            warmup_samples: 5,
            ..test_config()
        };
        let mut pipeline = BlinkPipeline::new(config).unwrap();
        for _ in 0..10 {
            pipeline.process_sample(100);
        }
        pipeline.process_sample(900);
        for _ in 0..400 {
            pipeline.process_sample(100);
        }
        assert_eq!(pipeline.stats().total_candidates, 1);
        assert_eq!(pipeline.stats().dropped_excursions, 1);
        assert_eq!(pipeline.stats().total_blinks, 0);
    }

    #[test]
    fn test_baseline_snapshot_counts() {
        let mut pipeline = BlinkPipeline::new(test_config()).unwrap();
        for _ in 0..2500 {
            pipeline.process_sample(100);
        }
        let baseline = pipeline.baseline();
        assert_eq!(baseline.samples_seen, 2500);
        // Ring capacity is 2000, so only that much is buffered
        assert_eq!(baseline.buffered, 2000);
    }
}
