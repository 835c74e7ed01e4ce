//! Platform fact providers.
//!
//! Checks never talk to the operating system directly; they consult a
//! [`FactProvider`], of which there is exactly one implementation per target
//! OS, selected once at startup by [`native`]. Everything a check asserts on
//! is a discrete fact returned here.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "windows")]
pub mod windows;

use crate::error::Result;

/// Per-device liveness as reported by the driver.
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Whether the platform considers the device online.
    pub online: bool,
    /// The raw state string, for failure detail.
    pub state: String,
    /// BIOS POST code; "FF" means boot completed.
    pub post_code: String,
}

/// Platform-specific source of truth queried by checks.
///
/// Every query either returns its fact or fails with a typed error:
/// `ExternalTool` when an OS utility or system interface is missing or
/// errors, `DeviceQuery` when a per-device management query fails. No query
/// mutates device or host state.
pub trait FactProvider {
    /// Count of coprocessors visible on the PCI bus. Ground truth for the
    /// device count; the driver's own count is cross-checked against it.
    fn bus_device_count(&self) -> Result<u32>;

    /// Whether the mic driver is active on the host.
    fn driver_loaded(&self) -> Result<bool>;

    /// How many devices the driver itself reports.
    fn driver_device_count(&self) -> Result<u32>;

    /// Whether the management daemon is running.
    fn daemon_running(&self) -> Result<bool>;

    /// Version string of the loaded driver.
    fn driver_version(&self) -> Result<String>;

    fn device_state(&self, device: u32) -> Result<DeviceState>;

    fn device_ras_available(&self, device: u32) -> Result<bool>;

    fn device_smc_firmware_version(&self, device: u32) -> Result<String>;

    /// Running flash version of the device. Not available on every platform;
    /// the corresponding check only exists where it is.
    fn device_flash_version(&self, device: u32) -> Result<String>;

    /// Whether `mic<N>` answers a ping within the probe timeout.
    fn device_pingable(&self, device: u32) -> Result<bool>;

    /// Whether `mic<N>` accepts a non-interactive ssh session.
    fn device_ssh_reachable(&self, device: u32) -> Result<bool>;
}

/// Device management access, the seam standing in for the native management
/// library: open a per-device handle, query it, and release it on every exit
/// path. Handles release their resources on drop, so a failed query can
/// never leak one.
pub trait MgmtLibrary {
    type Handle: MgmtHandle;

    fn open_device(&self, device: u32) -> Result<Self::Handle>;
}

/// A scoped handle to one device's management interface.
pub trait MgmtHandle {
    fn ras_available(&mut self) -> Result<bool>;
    fn smc_firmware_version(&mut self) -> Result<String>;
    fn flash_version(&mut self) -> Result<String>;
}

/// The fact provider for the build target.
#[cfg(target_os = "linux")]
pub fn native() -> linux::LinuxFacts {
    linux::LinuxFacts::new()
}

/// The fact provider for the build target.
#[cfg(target_os = "windows")]
pub fn native() -> windows::WindowsFacts {
    windows::WindowsFacts::new()
}
