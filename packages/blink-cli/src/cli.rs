use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blinklab",
    version,
    about = "Real-time blink detection over proximity-sensor streams",
    long_about = "Run blink detection over recorded or synthetic proximity streams.\n\
                  Readings are scored against a canonical blink waveform after a\n\
                  statistical candidate pass over the running baseline."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a recorded stream through the detection pipeline
    Run(RunArgs),
    /// Generate a synthetic stream and report what the pipeline detects
    Simulate(SimulateArgs),
    /// Show the canonical blink template
    Template(TemplateArgs),
}

/// Detection tuning shared by `run` and `simulate`; unset flags fall
/// back to the pipeline defaults.
#[derive(Args)]
pub struct TuningArgs {
    /// Raw-history ring capacity, in samples
    #[arg(long)]
    pub history: Option<usize>,

    /// Trigger margin as a multiple of the running stdev
    #[arg(long)]
    pub multiplier: Option<f64>,

    /// Absolute trigger-margin floor, in sensor counts
    #[arg(long)]
    pub floor: Option<f64>,

    /// Consecutive in-margin samples before the detector re-arms
    #[arg(long)]
    pub debounce: Option<u32>,

    /// Samples to observe before the first trigger is allowed
    #[arg(long)]
    pub warmup: Option<u64>,

    /// Sum-of-squared-error cutoff for a confirmed blink
    #[arg(long)]
    pub cutoff: Option<f64>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Recording file: whitespace-separated integer readings, '#' comments
    #[arg(long)]
    pub file: String,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Write the JSON summary to a file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of blinks to inject
    #[arg(long, default_value_t = 3)]
    pub blinks: usize,

    /// Baseline sensor level
    #[arg(long, default_value_t = 100)]
    pub baseline: i32,

    /// Blink amplitude above baseline, in sensor counts
    #[arg(long, default_value_t = 900.0)]
    pub amplitude: f64,

    /// Quiet samples before, between and after blinks
    #[arg(long, default_value_t = 3000)]
    pub spacing: usize,

    /// Peak-to-peak uniform noise on every sample, in sensor counts
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Noise generator seed
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Write the JSON report to a file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Emit the template as JSON (metadata plus values)
    #[arg(long)]
    pub json: bool,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl TuningArgs {
    /// Overlay set flags onto the default pipeline configuration.
    pub fn to_config(&self) -> blink_rs::PipelineConfig {
        let mut config = blink_rs::PipelineConfig::default();
        if let Some(history) = self.history {
            config.raw_history_len = history;
        }
        if let Some(multiplier) = self.multiplier {
            config.threshold_multiplier = multiplier;
        }
        if let Some(floor) = self.floor {
            config.deviation_floor = floor;
        }
        if let Some(debounce) = self.debounce {
            config.debounce_samples = debounce;
        }
        if let Some(warmup) = self.warmup {
            config.warmup_samples = warmup;
        }
        if let Some(cutoff) = self.cutoff {
            config.match_cutoff = cutoff;
        }
        config
    }
}
