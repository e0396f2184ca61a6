use std::io::Write;
use std::path::Path;

use crate::exit_codes;

/// Serialize a detection report and deliver it to stdout or a file,
/// translating any failure into the process exit code.
pub fn emit_report<T: serde::Serialize>(
    report: &T,
    compact: bool,
    destination: Option<&str>,
) -> i32 {
    let json = if compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize report: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    match destination {
        Some(path) => {
            if let Err(e) = std::fs::write(Path::new(path), &json) {
                eprintln!("Error: failed to write report to '{}': {}", path, e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            if let Err(e) = handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
            {
                eprintln!("Error: failed to write report to stdout: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    }
    exit_codes::SUCCESS
}
