//! The four-phase test plan.
//!
//! Host phases (default, then optional) run first and propagate any failure
//! immediately: probing devices is meaningless when none are detected or the
//! driver is absent. Device phases (default, then optional) run every
//! enabled check per device inside an isolation boundary: a failing device
//! is recorded and the loop continues with the next one, and a single
//! aggregate failure is raised after the loop.

use crate::checks::device::{DeviceStateCheck, RasCheck, SmcFirmwareCheck};
#[cfg(target_os = "linux")]
use crate::checks::device::{FlashVersionCheck, PingCheck, SshCheck};
#[cfg(target_os = "linux")]
use crate::checks::host::MpssDaemonCheck;
use crate::checks::host::{
    DriverDevicesCheck, DriverLoadedCheck, DriverVersionCheck, PciDevicesCheck,
};
use crate::cli::Cli;
use crate::engine::report::{RunReport, RunStatus};
use crate::engine::runner::TestRunner;
use crate::error::{MiccheckError, Result};
use crate::output;
use crate::platform::FactProvider;
use crate::version::BuildInfo;

pub struct Orchestrator<'a> {
    facts: &'a dyn FactProvider,
    build: &'a BuildInfo,
    opts: &'a Cli,
    runner: TestRunner,
    emit_lines: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(facts: &'a dyn FactProvider, build: &'a BuildInfo, opts: &'a Cli) -> Self {
        let emit_lines = opts.format == "pretty";
        Orchestrator {
            facts,
            build,
            opts,
            runner: TestRunner::new(emit_lines),
            emit_lines,
        }
    }

    /// Run all four phases over the resolved device list.
    pub fn run(&mut self, devices: &[u32]) -> Result<()> {
        self.default_host_tests()?;
        self.optional_host_tests()?;
        self.default_device_tests(devices)?;
        self.optional_device_tests(devices)?;
        Ok(())
    }

    /// Consume the orchestrator into the run's report.
    pub fn into_report(self, failure: Option<MiccheckError>) -> RunReport {
        let Orchestrator { build, runner, .. } = self;
        RunReport {
            tool_version: build.version.clone(),
            generated_at: chrono::Utc::now(),
            status: if failure.is_some() {
                RunStatus::Fail
            } else {
                RunStatus::Ok
            },
            failure: failure.map(|err| err.to_string()),
            tests_run: runner.tests_run(),
            outcomes: runner.into_outcomes(),
        }
    }

    fn banner(&self, message: &str) {
        if self.emit_lines {
            output::p_out(message);
        }
    }

    fn default_host_tests(&mut self) -> Result<()> {
        self.banner("Executing default tests for host");

        if self.opts.pci_numdev {
            self.runner.run(&PciDevicesCheck, self.facts)?;
        }
        if self.opts.driver_loaded {
            self.runner.run(&DriverLoadedCheck, self.facts)?;
        }
        if self.opts.driver_numdev {
            self.runner.run(&DriverDevicesCheck, self.facts)?;
        }
        #[cfg(target_os = "linux")]
        {
            if self.opts.mpssd_loaded {
                self.runner.run(&MpssDaemonCheck, self.facts)?;
            }
        }
        Ok(())
    }

    fn optional_host_tests(&mut self) -> Result<()> {
        if self.opts.driver_ver {
            self.banner("Executing optional tests for host");
            let check = DriverVersionCheck {
                reference: self.build.version.clone(),
            };
            self.runner.run(&check, self.facts)?;
        }
        Ok(())
    }

    fn default_device_tests(&mut self, devices: &[u32]) -> Result<()> {
        let mut device_failed = false;

        for &device in devices {
            self.banner(&format!("Executing default tests for device: {}", device));
            match self.device_default_suite(device) {
                Ok(()) => {}
                // Isolation boundary: this device is done for, the rest of
                // the list still gets tested.
                Err(err) if err.isolates_to_device() => device_failed = true,
                Err(err) => return Err(err),
            }
        }

        if device_failed {
            return Err(MiccheckError::check("A device test failed"));
        }
        Ok(())
    }

    fn device_default_suite(&mut self, device: u32) -> Result<()> {
        if self.opts.dev_state {
            self.runner.run(&DeviceStateCheck { device }, self.facts)?;
        }
        if self.opts.dev_rasdaemon {
            self.runner.run(&RasCheck { device }, self.facts)?;
        }
        #[cfg(target_os = "linux")]
        {
            if self.opts.flash_ver {
                let check = FlashVersionCheck {
                    device,
                    reference: self.build.flash_version.clone(),
                };
                self.runner.run(&check, self.facts)?;
            }
        }
        if self.opts.smc_ver {
            let check = SmcFirmwareCheck {
                device,
                reference: self.build.smc_firmware_version.clone(),
            };
            self.runner.run(&check, self.facts)?;
        }
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn optional_device_tests(&mut self, devices: &[u32]) -> Result<()> {
        if !(self.opts.ping || self.opts.ssh) {
            return Ok(());
        }

        let mut device_failed = false;
        for &device in devices {
            self.banner(&format!("Executing optional tests for device: {}", device));
            match self.device_optional_suite(device) {
                Ok(()) => {}
                Err(err) if err.isolates_to_device() => device_failed = true,
                Err(err) => return Err(err),
            }
        }

        if device_failed {
            return Err(MiccheckError::check("An optional device test failed"));
        }
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn device_optional_suite(&mut self, device: u32) -> Result<()> {
        if self.opts.ping {
            self.runner.run(&PingCheck { device }, self.facts)?;
        }
        if self.opts.ssh {
            self.runner.run(&SshCheck { device }, self.facts)?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn optional_device_tests(&mut self, _devices: &[u32]) -> Result<()> {
        // No optional device checks exist off Linux.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::MockFacts;
    use clap::Parser;

    fn quiet_cli(args: &[&str]) -> Cli {
        let mut argv = vec!["miccheck", "--format", "json"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn run_with(facts: &MockFacts, cli: &Cli) -> RunReport {
        let build = BuildInfo::from_build();
        let devices: Vec<u32> = (0..facts.devices.len() as u32).collect();
        let mut orchestrator = Orchestrator::new(facts, &build, cli);
        let outcome = orchestrator.run(&devices);
        orchestrator.into_report(outcome.err())
    }

    #[test]
    fn test_healthy_run_passes_every_phase() {
        let facts = MockFacts::healthy(2);
        let report = run_with(&facts, &quiet_cli(&[]));
        assert_eq!(report.status, RunStatus::Ok);
        assert!(report.failure.is_none());
        // 4 host checks, then 4 default checks per device on Linux.
        #[cfg(target_os = "linux")]
        assert_eq!(report.tests_run, 12);
    }

    #[test]
    fn test_host_failure_aborts_before_device_phases() {
        let mut facts = MockFacts::healthy(2);
        facts.driver_loaded = false;
        let report = run_with(&facts, &quiet_cli(&[]));

        assert_eq!(report.status, RunStatus::Fail);
        assert_eq!(report.failure.as_deref(), Some("mic driver not loaded"));
        // PCI check passed, driver check failed, nothing ran after it.
        assert_eq!(report.tests_run, 2);
        assert!(report.outcomes.iter().all(|o| o.scope == "host"));
    }

    #[test]
    fn test_device_failure_is_isolated_and_aggregated() {
        let mut facts = MockFacts::healthy(2);
        facts.devices[0].state = "resetting".to_string();
        let report = run_with(&facts, &quiet_cli(&[]));

        assert_eq!(report.status, RunStatus::Fail);
        assert_eq!(report.failure.as_deref(), Some("A device test failed"));

        // Device 0 stopped at its first check; device 1 ran its full suite.
        let mic1_count = report
            .outcomes
            .iter()
            .filter(|o| o.scope == "mic1")
            .count();
        #[cfg(target_os = "linux")]
        assert_eq!(mic1_count, 4);
        assert!(mic1_count >= 3);
        let mic0_count = report
            .outcomes
            .iter()
            .filter(|o| o.scope == "mic0")
            .count();
        assert_eq!(mic0_count, 1);
    }

    #[test]
    fn test_sequence_numbers_are_gapless_across_phases() {
        let mut facts = MockFacts::healthy(3);
        facts.devices[1].ras_available = false;
        let report = run_with(&facts, &quiet_cli(&["--driver-ver"]));

        let sequences: Vec<u32> = report.outcomes.iter().map(|o| o.sequence).collect();
        let expected: Vec<u32> = (0..report.tests_run).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn test_disabled_checks_do_not_run() {
        let facts = MockFacts::healthy(1);
        let report = run_with(
            &facts,
            &quiet_cli(&["--dev-rasdaemon", "false", "--smc-ver", "false"]),
        );
        assert_eq!(report.status, RunStatus::Ok);
        assert!(!report
            .outcomes
            .iter()
            .any(|o| o.description.contains("ras daemon")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_optional_device_phase_has_its_own_aggregate() {
        let mut facts = MockFacts::healthy(2);
        facts.devices[1].pingable = false;
        let report = run_with(&facts, &quiet_cli(&["--ping", "--ssh"]));

        assert_eq!(
            report.failure.as_deref(),
            Some("An optional device test failed")
        );
        // Device 1's ping failed, so its ssh check was skipped; device 0 ran
        // both probes.
        let mic0_probes = report
            .outcomes
            .iter()
            .filter(|o| o.scope == "mic0" && o.description.starts_with("Check device can"))
            .count();
        assert_eq!(mic0_probes, 2);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_flash_mismatch_alone_keeps_the_run_green() {
        let mut facts = MockFacts::healthy(1);
        facts.devices[0].flash_version = "0.0.00.0000".to_string();
        let report = run_with(&facts, &quiet_cli(&[]));
        assert_eq!(report.status, RunStatus::Ok);
    }
}
