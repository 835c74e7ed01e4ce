//! Device-scoped checks, each bound to one bus-validated device index.

use super::{Check, Scope};
use crate::error::{MiccheckError, Result};
use crate::output;
use crate::platform::FactProvider;

/// The device must be online with POST completed (postcode FF).
pub struct DeviceStateCheck {
    pub device: u32,
}

impl Check for DeviceStateCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check device is in online state and its postcode is FF".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        let state = facts.device_state(self.device)?;
        if !state.online {
            return Err(MiccheckError::check(format!(
                "device is not online: {}",
                state.state
            )));
        }
        if state.post_code != "FF" {
            return Err(MiccheckError::check(format!(
                "device postcode is not FF: {}",
                state.post_code
            )));
        }
        Ok(())
    }
}

pub struct RasCheck {
    pub device: u32,
}

impl Check for RasCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check ras daemon is available in device".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if !facts.device_ras_available(self.device)? {
            return Err(MiccheckError::check("ras daemon is not available"));
        }
        Ok(())
    }
}

/// Informational only: a flash mismatch is logged but never fails the run.
/// Firmware updates ship ahead of host packages often enough that failing
/// here produced more noise than signal.
pub struct FlashVersionCheck {
    pub device: u32,
    pub reference: String,
}

impl Check for FlashVersionCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check running flash version is correct".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        let current = facts.device_flash_version(self.device)?;
        // The packaged reference may carry a hotfix suffix the device never
        // reports; compare without it.
        let reference = self
            .reference
            .split_once('-')
            .map_or(self.reference.as_str(), |(base, _)| base);

        if current == reference {
            output::p_debug(&format!("    device flash version: '{}'", current));
        } else {
            output::p_debug(&format!(
                "    device flash version does not match, should be '{}', it is '{}'",
                reference, current
            ));
        }
        Ok(())
    }
}

/// The running SMC firmware version must exactly match the build-time
/// reference.
pub struct SmcFirmwareCheck {
    pub device: u32,
    pub reference: String,
}

impl Check for SmcFirmwareCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check running SMC firmware version is correct".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        let current = facts.device_smc_firmware_version(self.device)?;
        if current != self.reference {
            return Err(MiccheckError::check(format!(
                "device SMC firmware version does not match, should be '{}', it is '{}'",
                self.reference, current
            )));
        }
        Ok(())
    }
}

pub struct PingCheck {
    pub device: u32,
}

impl Check for PingCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check device can be pinged over its network interface".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if !facts.device_pingable(self.device)? {
            return Err(MiccheckError::check(format!(
                "interface mic{} did not respond to ping request",
                self.device
            )));
        }
        Ok(())
    }
}

pub struct SshCheck {
    pub device: u32,
}

impl Check for SshCheck {
    fn scope(&self) -> Scope {
        Scope::Device(self.device)
    }

    fn description(&self) -> String {
        "Check device can be accessed through ssh".to_string()
    }

    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()> {
        if !facts.device_ssh_reachable(self.device)? {
            return Err(MiccheckError::check(format!(
                "interface mic{} could not be accessed through ssh",
                self.device
            )));
        }
        Ok(())
    }
}
