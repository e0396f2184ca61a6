use std::path::Path;

use crate::cli::RunArgs;
use crate::exit_codes;
use crate::output;

pub fn execute(args: RunArgs) -> i32 {
    if !Path::new(&args.file).exists() {
        eprintln!("Error: recording file not found: {}", args.file);
        return exit_codes::INPUT_ERROR;
    }

    let config = args.tuning.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return exit_codes::INPUT_ERROR;
    }

    if !args.quiet {
        eprintln!("Replaying {} through the detection pipeline...", args.file);
        eprintln!(
            "  History: {} samples, margin: {}x stdev (floor {}), cutoff: {}",
            config.raw_history_len,
            config.threshold_multiplier,
            config.deviation_floor,
            config.match_cutoff
        );
    }

    let summary = match blink_rs::replay_file(&args.file, config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    if !args.quiet {
        eprintln!(
            "Processed {} samples: {} candidates, {} confirmed blinks",
            summary.samples_processed, summary.total_candidates, summary.total_blinks
        );
    }

    let code = output::emit_report(&summary, args.compact, args.output.as_deref());
    if code == exit_codes::SUCCESS && !args.quiet {
        if let Some(ref path) = args.output {
            eprintln!("Summary written to {}", path);
        }
    }
    code
}
