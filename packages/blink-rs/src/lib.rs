pub mod detector;
pub mod driver;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod pipeline;
pub mod replay;
pub mod ring;
pub mod sensor;
pub mod stats;
pub mod template;
pub mod types;

pub use detector::{CandidateDetector, DetectorState};
pub use driver::{BaselineHandle, DriverStats, PipelineDriver, SampleReadyFlag};
pub use error::{BlinkError, Result};
pub use ledger::EventLedger;
pub use matcher::{MatchOutcome, WaveformMatcher};
pub use pipeline::BlinkPipeline;
pub use replay::{replay, replay_file, ReplaySummary};
pub use ring::RingBuffer;
pub use sensor::{ProximitySensor, RegisterBus, SensorLink};
pub use stats::StatsTracker;
pub use template::{Template, TEMPLATE_LEN};
pub use types::*;
