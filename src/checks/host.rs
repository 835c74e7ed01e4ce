//! Host-scoped checks: bus enumeration, driver presence, device-count
//! cross-check, daemon status, and driver version.

use super::{Check, Scope};
use crate::error::{MiccheckError, Result};
use crate::output;
use crate::platform::FactProvider;
use crate::version::versions_match;

/// At least one coprocessor must be visible on the PCI bus.
pub struct PciDevicesCheck;

impl Check for PciDevicesCheck {
    fn scope(&self) -> Scope {
        Scope::Host
    }

    fn description(&self) -> String {
        "Check number of devices the OS sees in the system".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if facts.bus_device_count()? < 1 {
            return Err(MiccheckError::check(
                "no Intel(R) Xeon Phi(TM) coprocessors detected",
            ));
        }
        Ok(())
    }
}

pub struct DriverLoadedCheck;

impl Check for DriverLoadedCheck {
    fn scope(&self) -> Scope {
        Scope::Host
    }

    fn description(&self) -> String {
        "Check mic driver is loaded".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if !facts.driver_loaded()? {
            return Err(MiccheckError::check("mic driver not loaded"));
        }
        Ok(())
    }
}

/// The driver must report the same number of devices as PCI enumeration.
/// The bus is ground truth; a mismatch is a diagnostic signal, not a model
/// inconsistency.
pub struct DriverDevicesCheck;

impl Check for DriverDevicesCheck {
    fn scope(&self) -> Scope {
        Scope::Host
    }

    fn description(&self) -> String {
        "Check number of devices driver sees in the system".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        let bus = facts.bus_device_count()?;
        let driver = facts.driver_device_count()?;
        if driver != bus {
            return Err(MiccheckError::check(format!(
                "driver sees {} device(s), PCI enumeration found {}",
                driver, bus
            )));
        }
        Ok(())
    }
}

pub struct MpssDaemonCheck;

impl Check for MpssDaemonCheck {
    fn scope(&self) -> Scope {
        Scope::Host
    }

    fn description(&self) -> String {
        "Check mpssd daemon is running".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if !facts.daemon_running()? {
            return Err(MiccheckError::check("mpssd daemon not running"));
        }
        Ok(())
    }
}

/// The loaded driver version must match the build-time reference, tolerating
/// a differing patch component.
pub struct DriverVersionCheck {
    pub reference: String,
}

impl Check for DriverVersionCheck {
    fn scope(&self) -> Scope {
        Scope::Host
    }

    fn description(&self) -> String {
        "Check loaded driver version is correct".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        let actual = facts.driver_version()?;
        if !versions_match(&self.reference, &actual) {
            return Err(MiccheckError::check(format!(
                "loaded driver version incorrect: '{}', reference is '{}'.",
                actual, self.reference
            )));
        }
        output::p_debug(&format!(
            "    loaded driver version '{}', reference is '{}'.",
            actual, self.reference
        ));
        Ok(())
    }
}
