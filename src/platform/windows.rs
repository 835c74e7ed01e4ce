//! Windows fact provider.
//!
//! Facts come from WMI, queried through `wmic`: PCI enumeration from
//! `win32_pnpentity`, everything driver-side from instances of the `MIC`
//! class in `root\wmi`. Flash version and the network probes have no
//! Windows counterpart; their CLI flags do not exist on this platform.

use std::process::Command;

use super::{DeviceState, FactProvider, MgmtHandle, MgmtLibrary};
use crate::error::{MiccheckError, Result};

// Opaque WMI state code reported for a fully booted device. No symbolic
// name is published for it; treat it as the platform's definition of online.
const MIC_STATE_ONLINE: u32 = 4;

pub struct WindowsFacts {
    mgmt: WmiMgmt,
}

impl WindowsFacts {
    pub fn new() -> Self {
        WindowsFacts { mgmt: WmiMgmt }
    }
}

impl Default for WindowsFacts {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `wmic` with the given arguments and return its stdout.
fn wmic(args: &[&str]) -> Result<String> {
    let output = Command::new("wmic")
        .args(args)
        .output()
        .map_err(|err| MiccheckError::tool("wmic", err.to_string()))?;
    if !output.status.success() {
        return Err(MiccheckError::tool(
            "wmic",
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Values of one property across all MIC instances, in instance order.
fn mic_property_values(property: &str) -> Result<Vec<String>> {
    let output = wmic(&[
        "/namespace:\\\\root\\wmi",
        "path",
        "MIC",
        "get",
        property,
        "/value",
    ])?;
    let prefix = format!("{}=", property);
    Ok(output
        .lines()
        .filter_map(|line| line.trim().strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
        .collect())
}

fn mic_property(device: u32, property: &str) -> Result<String> {
    let values = mic_property_values(property)?;
    values
        .get(device as usize)
        .cloned()
        .ok_or_else(|| MiccheckError::device(device, format!("no WMI instance for {}", property)))
}

impl FactProvider for WindowsFacts {
    fn bus_device_count(&self) -> Result<u32> {
        let output = wmic(&["path", "win32_pnpentity", "get", "DeviceID"])?;
        let count = output
            .lines()
            .filter(|line| line.contains("VEN_8086&DEV_225"))
            .count();
        Ok(count as u32)
    }

    fn driver_loaded(&self) -> Result<bool> {
        // The MIC WMI class only has instances when the driver is active.
        Ok(self.driver_device_count()? >= 1)
    }

    fn driver_device_count(&self) -> Result<u32> {
        match mic_property_values("State") {
            Ok(values) => Ok(values.len() as u32),
            // An absent class means no driver, not a broken host.
            Err(MiccheckError::ExternalTool { .. }) => Ok(0),
            Err(err) => Err(err),
        }
    }

    fn daemon_running(&self) -> Result<bool> {
        Err(MiccheckError::check(
            "daemon check is not supported on Windows",
        ))
    }

    fn driver_version(&self) -> Result<String> {
        mic_property(0, "DriverVersion")
    }

    fn device_state(&self, device: u32) -> Result<DeviceState> {
        let state = mic_property(device, "State")?;
        let post_code = mic_property(device, "PostCode")?;
        let code: u32 = state
            .parse()
            .map_err(|_| MiccheckError::device(device, format!("unexpected state '{}'", state)))?;
        Ok(DeviceState {
            online: code == MIC_STATE_ONLINE,
            state,
            post_code,
        })
    }

    fn device_ras_available(&self, device: u32) -> Result<bool> {
        let mut handle = self.mgmt.open_device(device)?;
        handle.ras_available()
    }

    fn device_smc_firmware_version(&self, device: u32) -> Result<String> {
        let mut handle = self.mgmt.open_device(device)?;
        handle.smc_firmware_version()
    }

    fn device_flash_version(&self, device: u32) -> Result<String> {
        Err(MiccheckError::device(
            device,
            "flash version query is not supported on Windows",
        ))
    }

    fn device_pingable(&self, device: u32) -> Result<bool> {
        Err(MiccheckError::device(
            device,
            "network probes are not supported on Windows",
        ))
    }

    fn device_ssh_reachable(&self, device: u32) -> Result<bool> {
        Err(MiccheckError::device(
            device,
            "network probes are not supported on Windows",
        ))
    }
}

/// Management access over WMI, with the same scoped-handle discipline as the
/// Linux provider.
struct WmiMgmt;

struct WmiHandle {
    device: u32,
}

impl MgmtLibrary for WmiMgmt {
    type Handle = WmiHandle;

    fn open_device(&self, device: u32) -> Result<Self::Handle> {
        let instances = mic_property_values("State")?;
        if (device as usize) < instances.len() {
            Ok(WmiHandle { device })
        } else {
            Err(MiccheckError::device(
                device,
                "device could not be initialized",
            ))
        }
    }
}

impl MgmtHandle for WmiHandle {
    fn ras_available(&mut self) -> Result<bool> {
        Ok(mic_property(self.device, "RasAvailable")? == "1")
    }

    fn smc_firmware_version(&mut self) -> Result<String> {
        mic_property(self.device, "SmcFirmwareVersion")
    }

    fn flash_version(&mut self) -> Result<String> {
        Err(MiccheckError::device(
            self.device,
            "flash version query is not supported on Windows",
        ))
    }
}
