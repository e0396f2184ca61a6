// Sample-ready polling loop
//
// Exactly one asynchronous producer exists: the hardware interrupt, which
// does nothing but raise a flag. The driver owns that flag as a single
// atomic boolean, polls it, pulls the reading from the sensor and drives
// the pipeline synchronously. All pipeline state stays on this one
// thread; only the flag and the published baseline snapshot are shared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::pipeline::BlinkPipeline;
use crate::sensor::ProximitySensor;
use crate::types::{BaselineSnapshot, SampleOutcome};

/// The interrupt-side handle: raised by the "new sample ready" signal,
/// consumed by the driver loop.
#[derive(Debug, Clone, Default)]
pub struct SampleReadyFlag(Arc<AtomicBool>);

impl SampleReadyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the interrupt context. No computation happens there.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the flag; true at most once per raise.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Read-only view of the published baseline, for reporting collaborators
/// polling from other threads.
#[derive(Clone)]
pub struct BaselineHandle {
    inner: Arc<RwLock<BaselineSnapshot>>,
}

impl BaselineHandle {
    pub fn snapshot(&self) -> BaselineSnapshot {
        self.inner.read().clone()
    }
}

/// Driver loop accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverStats {
    /// Ticks where the flag was raised
    pub ticks: u64,
    /// Ticks that produced a processed sample
    pub samples_processed: u64,
    /// Ticks skipped because the sensor read failed
    pub sensor_errors: u64,
    /// Mean per-sample pipeline latency, microseconds
    pub avg_tick_micros: f64,
}

/// Owns the sensor, the pipeline and the ready flag; drives one sample
/// per raised flag, strictly in arrival order.
pub struct PipelineDriver<S: ProximitySensor> {
    flag: SampleReadyFlag,
    sensor: S,
    pipeline: BlinkPipeline,
    baseline: Arc<RwLock<BaselineSnapshot>>,
    stats: DriverStats,
    tick_micros_total: f64,
}

impl<S: ProximitySensor> PipelineDriver<S> {
    pub fn new(sensor: S, pipeline: BlinkPipeline) -> Self {
        Self {
            flag: SampleReadyFlag::new(),
            sensor,
            pipeline,
            baseline: Arc::new(RwLock::new(BaselineSnapshot::default())),
            stats: DriverStats::default(),
            tick_micros_total: 0.0,
        }
    }

    /// Clone of the ready flag, for wiring into the interrupt handler.
    pub fn flag(&self) -> SampleReadyFlag {
        self.flag.clone()
    }

    /// Handle for reporting collaborators to poll the running baseline.
    pub fn baseline_handle(&self) -> BaselineHandle {
        BaselineHandle {
            inner: Arc::clone(&self.baseline),
        }
    }

    /// One pass of the cooperative loop. Returns the sample outcome when
    /// a raised flag led to a processed reading.
    ///
    /// A failed sensor read means "no new data this cycle": it is logged,
    /// counted and absorbed, and the next tick proceeds normally.
    pub fn poll(&mut self) -> Option<SampleOutcome> {
        if !self.flag.take() {
            return None;
        }
        self.stats.ticks += 1;

        let reading = match self.sensor.read_reading() {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("sensor read failed, skipping tick: {}", e);
                self.stats.sensor_errors += 1;
                return None;
            }
        };

        let started = Instant::now();
        let outcome = self.pipeline.process_sample(reading);
        self.tick_micros_total += started.elapsed().as_secs_f64() * 1e6;

        self.stats.samples_processed += 1;
        self.stats.avg_tick_micros = self.tick_micros_total / self.stats.samples_processed as f64;

        *self.baseline.write() = self.pipeline.baseline();
        Some(outcome)
    }

    /// Poll until `stop` is set. The loop never blocks: an overrun tick
    /// surfaces as late flag observation, not as an error.
    pub fn run_until(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Acquire) {
            if self.poll().is_none() {
                std::hint::spin_loop();
            }
        }
    }

    pub fn pipeline(&self) -> &BlinkPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BlinkError, Result};
    use crate::types::{PipelineConfig, Sample};

    /// Sensor double replaying a fixed sequence, with scripted failures.
    struct ScriptedSensor {
        readings: Vec<Result<Sample>>,
        cursor: usize,
    }

    impl ScriptedSensor {
        fn new(readings: Vec<Result<Sample>>) -> Self {
            Self {
                readings,
                cursor: 0,
            }
        }
    }

    impl ProximitySensor for ScriptedSensor {
        fn read_reading(&mut self) -> Result<Sample> {
            let i = self.cursor.min(self.readings.len() - 1);
            self.cursor += 1;
            match &self.readings[i] {
                Ok(v) => Ok(*v),
                Err(_) => Err(BlinkError::Handshake("scripted".to_string())),
            }
        }
    }

    fn driver(readings: Vec<Result<Sample>>) -> PipelineDriver<ScriptedSensor> {
        let config = PipelineConfig {
            raw_history_len: 400,
            ..Default::default()
        };
        PipelineDriver::new(
            ScriptedSensor::new(readings),
            BlinkPipeline::new(config).unwrap(),
        )
    }

    #[test]
    fn test_poll_without_flag_does_nothing() {
        let mut driver = driver(vec![Ok(100)]);
        assert!(driver.poll().is_none());
        assert_eq!(driver.stats().ticks, 0);
    }

    #[test]
    fn test_flag_is_consumed_once() {
        let mut driver = driver(vec![Ok(100)]);
        driver.flag().raise();
        assert!(driver.poll().is_some());
        assert!(driver.poll().is_none());
        assert_eq!(driver.stats().samples_processed, 1);
    }

    #[test]
    fn test_sensor_error_skips_tick_and_continues() {
        let mut driver = driver(vec![
            Ok(100),
            Err(BlinkError::Handshake("x".to_string())),
            Ok(101),
        ]);
        let flag = driver.flag();

        flag.raise();
        assert!(driver.poll().is_some());

        flag.raise();
        assert!(driver.poll().is_none());
        assert_eq!(driver.stats().sensor_errors, 1);

        // The failed tick did not poison the stream
        flag.raise();
        let outcome = driver.poll().unwrap();
        assert_eq!(outcome.index, 1);
        assert_eq!(driver.stats().samples_processed, 2);
    }

    #[test]
    fn test_baseline_handle_tracks_pipeline() {
        let mut driver = driver(vec![Ok(100)]);
        let handle = driver.baseline_handle();
        assert_eq!(handle.snapshot().samples_seen, 0);

        for _ in 0..50 {
            driver.flag().raise();
            driver.poll();
        }
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.samples_seen, 50);
        assert!((snapshot.mean - 100.0).abs() < 1e-9);
    }
}
