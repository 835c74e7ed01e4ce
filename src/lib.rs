//! miccheck — software sanity checks for hosts with Intel Xeon Phi
//! coprocessors installed.
//!
//! One invocation runs four ordered phases of diagnostic checks (default and
//! optional, host- and device-scoped) against a platform-specific fact
//! provider, reports one line per check, and exits with the overall status.
//! All checks are read-only; nothing persists between runs.

pub mod checks;
pub mod cli;
pub mod devices;
pub mod engine;
pub mod error;
pub mod output;
pub mod platform;
pub mod version;

use cli::Cli;
use engine::orchestrator::Orchestrator;
use engine::report::RunReport;
use platform::FactProvider;
use version::BuildInfo;

/// Run a full diagnostic pass: resolve the device selection against the
/// live bus enumeration, then drive all four phases. Always yields a report;
/// the first propagated failure (or the device phases' aggregate failure)
/// becomes its failure message.
pub fn run_diagnostics(opts: &Cli, facts: &dyn FactProvider, build: &BuildInfo) -> RunReport {
    let mut orchestrator = Orchestrator::new(facts, build, opts);

    let outcome = facts
        .bus_device_count()
        .and_then(|count| devices::resolve_devices(&opts.device, count))
        .and_then(|selected| {
            output::p_debug(&format!("Discovered device(s) = {:?}", selected));
            orchestrator.run(&selected)
        });

    orchestrator.into_report(outcome.err())
}
