// Waveform confirmation by template matching
//
// A candidate's surrounding raw window is normalized to [0, 1] and scored
// against the ideal template by sum of squared error at matching offsets.
// Both sequences are aligned by construction (the window is centered on
// the excursion peak), so no cross-correlation search is performed and
// the match stays O(window length).

use crate::error::{BlinkError, Result};
use crate::template::Template;
use crate::types::Sample;

/// Classification verdict, carrying the score for diagnostics either way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    Matched { score: f64 },
    Rejected { score: f64 },
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    pub fn score(&self) -> f64 {
        match *self {
            MatchOutcome::Matched { score } | MatchOutcome::Rejected { score } => score,
        }
    }
}

/// Scores fixed-length raw windows against an immutable template.
#[derive(Debug, Clone)]
pub struct WaveformMatcher {
    template: Template,
    cutoff: f64,
}

impl WaveformMatcher {
    pub fn new(template: Template, cutoff: f64) -> Result<Self> {
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(BlinkError::InvalidConfig(format!(
                "match cutoff must be positive, got {}",
                cutoff
            )));
        }
        Ok(Self { template, cutoff })
    }

    /// Classify a raw window. Pure function of its inputs: the same
    /// window always yields the same verdict and score.
    ///
    /// A flat window (no amplitude variation) is rejected outright; there
    /// is no signal shape to compare and the normalization would divide
    /// by zero.
    pub fn classify(&self, window: &[Sample]) -> MatchOutcome {
        debug_assert_eq!(window.len(), self.template.len());

        let mut min = Sample::MAX;
        let mut max = Sample::MIN;
        for &v in window {
            min = min.min(v);
            max = max.max(v);
        }
        if max == min {
            return MatchOutcome::Rejected { score: f64::INFINITY };
        }

        let span = (max - min) as f64;
        let min = min as f64;
        let score: f64 = window
            .iter()
            .zip(self.template.values())
            .map(|(&v, &ideal)| {
                let normalized = (v as f64 - min) / span;
                let diff = normalized - ideal;
                diff * diff
            })
            .sum();

        if score < self.cutoff {
            MatchOutcome::Matched { score }
        } else {
            MatchOutcome::Rejected { score }
        }
    }

    pub fn window_len(&self) -> usize {
        self.template.len()
    }

    pub fn half_window(&self) -> usize {
        self.template.half_window()
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> WaveformMatcher {
        WaveformMatcher::new(Template::ideal(), 10.0).unwrap()
    }

    /// A window shaped exactly like the template at a given baseline and
    /// amplitude.
    fn template_window(baseline: f64, amplitude: f64) -> Vec<Sample> {
        Template::ideal()
            .values()
            .iter()
            .map(|t| (baseline + amplitude * t).round() as Sample)
            .collect()
    }

    #[test]
    fn test_template_shaped_window_matches() {
        let m = matcher();
        let outcome = m.classify(&template_window(100.0, 900.0));
        assert!(outcome.is_match(), "score was {}", outcome.score());
        // Rounding to integer counts is the only error source
        assert!(outcome.score() < 0.01);
    }

    #[test]
    fn test_match_is_amplitude_invariant() {
        let m = matcher();
        assert!(m.classify(&template_window(500.0, 3000.0)).is_match());
        assert!(m.classify(&template_window(0.0, 10_000.0)).is_match());
    }

    #[test]
    fn test_flat_window_rejected_immediately() {
        let m = matcher();
        let window = vec![123; m.window_len()];
        let outcome = m.classify(&window);
        assert!(!outcome.is_match());
        assert!(outcome.score().is_infinite());
    }

    #[test]
    fn test_noise_window_rejected() {
        let m = matcher();
        // Deterministic xorshift noise, no waveform shape
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let window: Vec<Sample> = (0..m.window_len())
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 1000) as Sample
            })
            .collect();
        let outcome = m.classify(&window);
        assert!(!outcome.is_match());
        assert!(outcome.score() > m.cutoff());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let m = matcher();
        let window = template_window(100.0, 900.0);
        let first = m.classify(&window);
        for _ in 0..10 {
            assert_eq!(m.classify(&window), first);
        }
    }

    #[test]
    fn test_inverted_window_rejected() {
        let m = matcher();
        let window: Vec<Sample> = Template::ideal()
            .values()
            .iter()
            .map(|t| (1000.0 - 900.0 * t) as Sample)
            .collect();
        assert!(!m.classify(&window).is_match());
    }

    #[test]
    fn test_non_positive_cutoff_rejected() {
        assert!(WaveformMatcher::new(Template::ideal(), 0.0).is_err());
        assert!(WaveformMatcher::new(Template::ideal(), f64::NAN).is_err());
    }
}
