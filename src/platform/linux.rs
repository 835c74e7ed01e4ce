//! Linux fact provider.
//!
//! Facts come from the places the mic stack actually publishes them: PCI
//! enumeration from `/sys/bus/pci/devices`, the driver from `/proc/modules`,
//! the daemon from the process table, per-device attributes from
//! `/sys/class/mic/mic<N>`, and network reachability from `ping`/`ssh`
//! probes with a short fixed timeout.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use pciid_parser::Database;
use sysinfo::System;

use super::{DeviceState, FactProvider, MgmtHandle, MgmtLibrary};
use crate::error::{MiccheckError, Result};
use crate::output;

const INTEL_VENDOR_ID: u16 = 0x8086;
// KNC coprocessors enumerate with PCI device ids in the 0x2250-0x225f window.
const MIC_DEVICE_ID_FIRST: u16 = 0x2250;
const MIC_DEVICE_ID_LAST: u16 = 0x225f;

const PROBE_TIMEOUT_SECS: u32 = 3;

pub struct LinuxFacts<M: MgmtLibrary = SysfsMgmt> {
    pci_root: PathBuf,
    mic_root: PathBuf,
    mgmt: M,
}

impl LinuxFacts<SysfsMgmt> {
    pub fn new() -> Self {
        let mic_root = PathBuf::from("/sys/class/mic");
        LinuxFacts {
            pci_root: PathBuf::from("/sys/bus/pci/devices"),
            mgmt: SysfsMgmt {
                mic_root: mic_root.clone(),
            },
            mic_root,
        }
    }
}

impl Default for LinuxFacts<SysfsMgmt> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MgmtLibrary> LinuxFacts<M> {
    fn with_mgmt(pci_root: PathBuf, mic_root: PathBuf, mgmt: M) -> Self {
        LinuxFacts {
            pci_root,
            mic_root,
            mgmt,
        }
    }

    /// Scan the PCI bus for coprocessors, returning (address, device id)
    /// pairs in bus order.
    fn mic_bus_devices(&self) -> Result<Vec<(String, u16)>> {
        let entries = fs::read_dir(&self.pci_root).map_err(|err| {
            MiccheckError::tool(self.pci_root.display().to_string(), err.to_string())
        })?;

        let mut devices = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let vendor = read_hex_file(&path.join("vendor"));
            let device = read_hex_file(&path.join("device"));
            if let (Some(vendor), Some(device)) = (vendor, device) {
                if vendor == INTEL_VENDOR_ID
                    && (MIC_DEVICE_ID_FIRST..=MIC_DEVICE_ID_LAST).contains(&device)
                {
                    devices.push((entry.file_name().to_string_lossy().into_owned(), device));
                }
            }
        }
        devices.sort();
        Ok(devices)
    }

    fn device_attr(&self, device: u32, attr: &str) -> Result<String> {
        let path = self.mic_root.join(format!("mic{}", device)).join(attr);
        fs::read_to_string(&path)
            .map(|value| value.trim().to_string())
            .map_err(|err| {
                MiccheckError::device(device, format!("could not read {}: {}", path.display(), err))
            })
    }
}

impl<M: MgmtLibrary> FactProvider for LinuxFacts<M> {
    fn bus_device_count(&self) -> Result<u32> {
        let devices = self.mic_bus_devices()?;
        if output::verbose_enabled() {
            for (address, device_id) in &devices {
                output::p_debug(&format!(
                    "  {}: {}",
                    address,
                    describe_device(*device_id)
                ));
            }
        }
        Ok(devices.len() as u32)
    }

    fn driver_loaded(&self) -> Result<bool> {
        let modules = procfs::modules()
            .map_err(|err| MiccheckError::tool("/proc/modules", err.to_string()))?;
        Ok(modules.contains_key("mic"))
    }

    fn driver_device_count(&self) -> Result<u32> {
        let entries = match fs::read_dir(&self.mic_root) {
            Ok(entries) => entries,
            // No class directory at all: the driver has created no devices.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(MiccheckError::tool(
                    self.mic_root.display().to_string(),
                    err.to_string(),
                ))
            }
        };

        let mut count = 0;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(suffix) = name.strip_prefix("mic") {
                if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn daemon_running(&self) -> Result<bool> {
        let mut sys = System::new_all();
        sys.refresh_all();
        Ok(sys
            .processes()
            .values()
            .any(|process| process.name().eq_ignore_ascii_case("mpssd")))
    }

    fn driver_version(&self) -> Result<String> {
        let path = self.mic_root.join("ctrl").join("version");
        fs::read_to_string(&path)
            .map(|value| value.trim().to_string())
            .map_err(|err| MiccheckError::tool(path.display().to_string(), err.to_string()))
    }

    fn device_state(&self, device: u32) -> Result<DeviceState> {
        let state = self.device_attr(device, "state")?;
        let post_code = self.device_attr(device, "post_code")?;
        Ok(DeviceState {
            online: state == "online",
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
        let mut handle = self.mgmt.open_device(device)?;
        handle.flash_version()
    }

    fn device_pingable(&self, device: u32) -> Result<bool> {
        let name = format!("mic{}", device);
        probe(
            "ping",
            &["-c1", &format!("-w{}", PROBE_TIMEOUT_SECS), &name],
        )
    }

    fn device_ssh_reachable(&self, device: u32) -> Result<bool> {
        let name = format!("mic{}", device);
        probe(
            "ssh",
            &[
                &format!("-oConnectTimeout={}", PROBE_TIMEOUT_SECS),
                "-oBatchMode=yes",
                "-oStrictHostKeyChecking=no",
                &name,
                "echo",
                "hello",
            ],
        )
    }
}

/// Run a short network probe; a nonzero exit is an unreachable device, a
/// missing binary is an external tool failure.
fn probe(tool: &str, args: &[&str]) -> Result<bool> {
    match Command::new(tool).args(args).output() {
        Ok(output) => Ok(output.status.success()),
        Err(err) => Err(MiccheckError::tool(tool, err.to_string())),
    }
}

fn read_hex_file(path: &Path) -> Option<u16> {
    let content = fs::read_to_string(path).ok()?;
    let hex_str = content.trim().strip_prefix("0x").unwrap_or(content.trim());
    u16::from_str_radix(hex_str, 16).ok()
}

/// Human-readable name for a coprocessor device id, for verbose output.
fn describe_device(device_id: u16) -> String {
    let fallback = format!("Intel coprocessor [0x{:04x}]", device_id);
    let Ok(db) = Database::read() else {
        return fallback;
    };
    let Some(vendor) = db.vendors.get(&INTEL_VENDOR_ID) else {
        return fallback;
    };
    match vendor.devices.get(&device_id) {
        Some(device) => format!("{} {}", vendor.name, device.name),
        None => fallback,
    }
}

/// Production management access: per-device queries are answered from the
/// device's sysfs node while holding an open handle on it, released when the
/// handle drops.
pub struct SysfsMgmt {
    mic_root: PathBuf,
}

pub struct SysfsHandle {
    device: u32,
    path: PathBuf,
    // Held open for the lifetime of the handle; closed on drop.
    _node: File,
}

impl MgmtLibrary for SysfsMgmt {
    type Handle = SysfsHandle;

    fn open_device(&self, device: u32) -> Result<Self::Handle> {
        let path = self.mic_root.join(format!("mic{}", device));
        let node = File::open(&path).map_err(|err| {
            MiccheckError::device(device, format!("device could not be initialized: {}", err))
        })?;
        Ok(SysfsHandle {
            device,
            path,
            _node: node,
        })
    }
}

impl SysfsHandle {
    fn read_attr(&self, attr: &str) -> Result<String> {
        let path = self.path.join(attr);
        fs::read_to_string(&path)
            .map(|value| value.trim().to_string())
            .map_err(|err| {
                MiccheckError::device(
                    self.device,
                    format!("could not read {}: {}", path.display(), err),
                )
            })
    }
}

impl MgmtHandle for SysfsHandle {
    fn ras_available(&mut self) -> Result<bool> {
        Ok(self.read_attr("ras_avail")? == "1")
    }

    fn smc_firmware_version(&mut self) -> Result<String> {
        self.read_attr("smc_fwversion")
    }

    fn flash_version(&mut self) -> Result<String> {
        self.read_attr("flashversion")
    }
}
