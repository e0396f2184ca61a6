use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use blink_rs::{replay, ReplaySummary, Sample, Template};

use crate::cli::SimulateArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct SimulateReport {
    blinks_injected: usize,
    blinks_detected: u64,
    baseline: i32,
    amplitude: f64,
    noise: f64,
    seed: u64,
    summary: ReplaySummary,
}

/// Build the synthetic stream: quiet spans with template-shaped blinks
/// in between, optional uniform noise on every sample.
fn synthesize(args: &SimulateArgs) -> Vec<Sample> {
    let template = Template::ideal();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let half_noise = args.noise / 2.0;
    let noisy = |level: f64, rng: &mut StdRng| -> Sample {
        let jitter = if half_noise > 0.0 {
            rng.gen_range(-half_noise..=half_noise)
        } else {
            0.0
        };
        (level + jitter).round() as Sample
    };

    let mut samples = Vec::new();
    for _ in 0..args.spacing {
        samples.push(noisy(args.baseline as f64, &mut rng));
    }
    for _ in 0..args.blinks {
        for &t in template.values() {
            samples.push(noisy(args.baseline as f64 + args.amplitude * t, &mut rng));
        }
        for _ in 0..args.spacing {
            samples.push(noisy(args.baseline as f64, &mut rng));
        }
    }
    samples
}

pub fn execute(args: SimulateArgs) -> i32 {
    let config = args.tuning.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return exit_codes::INPUT_ERROR;
    }

    let samples = synthesize(&args);
    if !args.quiet {
        eprintln!(
            "Simulating {} samples ({} blinks at amplitude {}, noise {})...",
            samples.len(),
            args.blinks,
            args.amplitude,
            args.noise
        );
    }

    let summary = match replay(&samples, config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let report = SimulateReport {
        blinks_injected: args.blinks,
        blinks_detected: summary.total_blinks,
        baseline: args.baseline,
        amplitude: args.amplitude,
        noise: args.noise,
        seed: args.seed,
        summary,
    };

    if !args.quiet {
        eprintln!(
            "Detected {}/{} injected blinks",
            report.blinks_detected, report.blinks_injected
        );
    }

    output::emit_report(&report, args.compact, args.output.as_deref())
}
