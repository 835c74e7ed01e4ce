use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, MiccheckError>;

/// Every failure the diagnostic run can produce.
///
/// The orchestrator dispatches on the kind: `Config` aborts before any check
/// runs, `ExternalTool` is fatal for the phase it occurs in, while
/// `CheckFailed` and `DeviceQuery` are caught at the per-device boundary in
/// the device phases so one bad card does not stop the others.
#[derive(Debug, Error)]
pub enum MiccheckError {
    /// Bad command-line input (device selection).
    #[error("{details}")]
    Config { details: String },

    /// A required OS utility or system interface is missing or errored.
    #[error("failed to execute '{tool}': {details}")]
    ExternalTool { tool: String, details: String },

    /// A per-device management query could not be completed.
    #[error("device {device}: {details}")]
    DeviceQuery { device: u32, details: String },

    /// A check ran to completion and its condition was not met.
    #[error("{0}")]
    CheckFailed(String),
}

impl MiccheckError {
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }

    pub fn tool(tool: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            details: details.into(),
        }
    }

    pub fn device(device: u32, details: impl Into<String>) -> Self {
        Self::DeviceQuery {
            device,
            details: details.into(),
        }
    }

    pub fn check(details: impl Into<String>) -> Self {
        Self::CheckFailed(details.into())
    }

    /// True for the kinds the device phases catch and aggregate instead of
    /// propagating.
    pub fn isolates_to_device(&self) -> bool {
        matches!(self, Self::CheckFailed(_) | Self::DeviceQuery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_phase_isolation_kinds() {
        assert!(MiccheckError::check("not met").isolates_to_device());
        assert!(MiccheckError::device(1, "handle lost").isolates_to_device());
        assert!(!MiccheckError::config("bad device").isolates_to_device());
        assert!(!MiccheckError::tool("lspci", "missing").isolates_to_device());
    }

    #[test]
    fn test_display_carries_detail() {
        let err = MiccheckError::tool("ping", "not found");
        assert_eq!(err.to_string(), "failed to execute 'ping': not found");
        let err = MiccheckError::check("device is not online: resetting");
        assert_eq!(err.to_string(), "device is not online: resetting");
    }
}
