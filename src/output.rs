use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable debug output for the rest of the process.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn verbose_enabled() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// One line of the human-readable report.
pub fn p_out(message: &str) {
    println!("{}", message);
}

/// Failure messages, kept off stdout so piped report output stays clean.
pub fn p_err(message: &str) {
    eprintln!("{}", message);
}

/// Verbose-only diagnostics. These go to stderr so `--format json|yaml`
/// output is never corrupted.
pub fn p_debug(message: &str) {
    if verbose_enabled() {
        eprintln!("{}", message);
    }
}

/// Serialize the run report in the requested format.
pub fn output_data<T: Serialize>(data: &T, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "yaml" => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
    }
    Ok(())
}
