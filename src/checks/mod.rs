//! The check abstraction and every check variant.
//!
//! A check is one named diagnostic condition: a description, a scope, and a
//! pure decision over [`FactProvider`] output. Checks are constructed per
//! phase, bound to a device index where device-scoped, and discarded after
//! execution.

pub mod device;
pub mod host;

use crate::error::Result;
use crate::platform::FactProvider;

/// Whether a check diagnoses the host or one coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Host,
    Device(u32),
}

pub trait Check {
    fn scope(&self) -> Scope;

    /// One line describing what is being checked, used verbatim in the
    /// report output.
    fn description(&self) -> String;

    /// Consult the fact provider and fail with a typed error when the
    /// condition is not met.
    fn evaluate(&self, facts: &dyn FactProvider) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::MiccheckError;
    use crate::platform::DeviceState;

    /// Configurable in-memory fact provider for check unit tests.
    pub struct MockFacts {
        pub bus_count: u32,
        pub driver_loaded: bool,
        pub driver_count: u32,
        pub daemon_running: bool,
        pub driver_version: String,
        pub devices: Vec<MockDevice>,
    }

    #[derive(Clone)]
    pub struct MockDevice {
        pub state: String,
        pub post_code: String,
        pub ras_available: bool,
        pub smc_version: String,
        pub flash_version: String,
        pub pingable: bool,
        pub ssh_reachable: bool,
    }

    impl Default for MockDevice {
        fn default() -> Self {
            MockDevice {
                state: "online".to_string(),
                post_code: "FF".to_string(),
                ras_available: true,
                smc_version: "1.16.5078".to_string(),
                flash_version: "2.1.02.0390".to_string(),
                pingable: true,
                ssh_reachable: true,
            }
        }
    }

    impl MockFacts {
        /// A healthy host with `count` healthy devices.
        pub fn healthy(count: u32) -> Self {
            MockFacts {
                bus_count: count,
                driver_loaded: true,
                driver_count: count,
                daemon_running: true,
                driver_version: "3.4.2".to_string(),
                devices: (0..count).map(|_| MockDevice::default()).collect(),
            }
        }

        fn device(&self, device: u32) -> Result<&MockDevice> {
            self.devices
                .get(device as usize)
                .ok_or_else(|| MiccheckError::device(device, "device could not be initialized"))
        }
    }

    impl FactProvider for MockFacts {
        fn bus_device_count(&self) -> Result<u32> {
            Ok(self.bus_count)
        }

        fn driver_loaded(&self) -> Result<bool> {
            Ok(self.driver_loaded)
        }

        fn driver_device_count(&self) -> Result<u32> {
            Ok(self.driver_count)
        }

        fn daemon_running(&self) -> Result<bool> {
            Ok(self.daemon_running)
        }

        fn driver_version(&self) -> Result<String> {
            Ok(self.driver_version.clone())
        }

        fn device_state(&self, device: u32) -> Result<DeviceState> {
            let dev = self.device(device)?;
            Ok(DeviceState {
                online: dev.state == "online",
                state: dev.state.clone(),
                post_code: dev.post_code.clone(),
            })
        }

        fn device_ras_available(&self, device: u32) -> Result<bool> {
            Ok(self.device(device)?.ras_available)
        }

        fn device_smc_firmware_version(&self, device: u32) -> Result<String> {
            Ok(self.device(device)?.smc_version.clone())
        }

        fn device_flash_version(&self, device: u32) -> Result<String> {
            Ok(self.device(device)?.flash_version.clone())
        }

        fn device_pingable(&self, device: u32) -> Result<bool> {
            Ok(self.device(device)?.pingable)
        }

        fn device_ssh_reachable(&self, device: u32) -> Result<bool> {
            Ok(self.device(device)?.ssh_reachable)
        }
    }
}
