use clap::Parser;

use miccheck::cli::Cli;
use miccheck::version::BuildInfo;
use miccheck::{output, platform, run_diagnostics};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    // Usage errors exit with code 2 via clap.
    let cli = Cli::parse();
    output::set_verbose(cli.verbose);

    let pretty = cli.format == "pretty";
    if pretty {
        output::p_out(&format!("miccheck {}\n", env!("CARGO_PKG_VERSION")));
    }

    let facts = platform::native();
    let build = BuildInfo::from_build();
    let report = run_diagnostics(&cli, &facts, &build);

    if pretty {
        match &report.failure {
            None => output::p_out("\nStatus: OK"),
            Some(message) => {
                output::p_out("\nStatus: FAIL");
                output::p_err(&format!("Failure: {}", message));
            }
        }
    } else if let Err(err) = output::output_data(&report, &cli.format) {
        output::p_err(&format!("could not serialize report: {}", err));
        return 1;
    }

    if report.failed() {
        1
    } else {
        0
    }
}
