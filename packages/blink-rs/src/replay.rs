// Offline replay of recorded proximity streams
//
// Recordings are plain ASCII: whitespace-separated integer readings, with
// `#` line comments tolerated. The replay drives the same pipeline the
// live loop uses, one sample at a time, and summarizes the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BlinkError, Result};
use crate::pipeline::BlinkPipeline;
use crate::types::{BaselineSnapshot, BlinkEvent, PipelineConfig, Sample};

/// Result of replaying one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub id: String,
    pub created_at: String,
    pub samples_processed: u64,
    pub total_candidates: u64,
    pub total_blinks: u64,
    pub rejected_windows: u64,
    pub dropped_excursions: u64,
    /// Confirmed blinks still retained by the ledger, oldest first
    pub blinks: Vec<BlinkEvent>,
    pub baseline: BaselineSnapshot,
}

/// Parse a recording into raw readings.
pub fn parse_recording(content: &str) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        for token in line.split_whitespace() {
            let value: Sample = token.parse().map_err(|_| {
                BlinkError::Parse(format!(
                    "invalid reading '{}' on line {}",
                    token,
                    line_no + 1
                ))
            })?;
            samples.push(value);
        }
    }
    Ok(samples)
}

/// Run a full sample sequence through a fresh pipeline.
pub fn replay(samples: &[Sample], config: PipelineConfig) -> Result<ReplaySummary> {
    let mut pipeline = BlinkPipeline::new(config)?;

    log::info!("Replaying {} samples", samples.len());
    for &sample in samples {
        pipeline.process_sample(sample);
    }

    let stats = pipeline.stats();
    log::info!(
        "Replay finished: {} candidates, {} blinks confirmed",
        stats.total_candidates,
        stats.total_blinks
    );

    Ok(ReplaySummary {
        id: Uuid::new_v4().to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        samples_processed: stats.total_samples,
        total_candidates: stats.total_candidates,
        total_blinks: stats.total_blinks,
        rejected_windows: stats.rejected_windows,
        dropped_excursions: stats.dropped_excursions,
        blinks: pipeline.ledger().blinks(),
        baseline: pipeline.baseline(),
    })
}

/// Load a recording file and replay it.
pub fn replay_file<P: AsRef<Path>>(path: P, config: PipelineConfig) -> Result<ReplaySummary> {
    let path = path.as_ref();
    log::info!("Loading recording from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let samples = parse_recording(&content)?;
    if samples.is_empty() {
        return Err(BlinkError::Parse(format!(
            "recording '{}' contains no readings",
            path.display()
        )));
    }
    replay(&samples, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_whitespace_and_comments() {
        let content = "# header\n100 101\n102\n\n103 # trailing\n";
        assert_eq!(parse_recording(content).unwrap(), vec![100, 101, 102, 103]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_recording("100 abc"),
            Err(BlinkError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_negative_readings() {
        assert_eq!(parse_recording("-5 7").unwrap(), vec![-5, 7]);
    }

    #[test]
    fn test_replay_quiet_recording() {
        let samples = vec![100; 3000];
        let config = PipelineConfig {
            raw_history_len: 1000,
            ..Default::default()
        };
        let summary = replay(&samples, config).unwrap();
        assert_eq!(summary.samples_processed, 3000);
        assert_eq!(summary.total_blinks, 0);
        assert!((summary.baseline.mean - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_replay_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for _ in 0..1500 {
            writeln!(file, "100").unwrap();
        }
        let config = PipelineConfig {
            raw_history_len: 1000,
            ..Default::default()
        };
        let summary = replay_file(file.path(), config).unwrap();
        assert_eq!(summary.samples_processed, 1500);
    }

    #[test]
    fn test_empty_recording_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(replay_file(file.path(), PipelineConfig::default()).is_err());
    }
}
