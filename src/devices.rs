//! Device selection: resolves the `--device` argument against the number of
//! coprocessors found on the PCI bus.

use crate::error::{MiccheckError, Result};

/// Resolve the requested device scope to a list of device indices.
///
/// `"all"` expands to every bus-enumerated device in ascending order; any
/// other value must be a single index in `[0, num_devices)`. The bus count
/// is queried once by the caller, before any check runs.
pub fn resolve_devices(requested: &str, num_devices: u32) -> Result<Vec<u32>> {
    if requested == "all" {
        return Ok((0..num_devices).collect());
    }

    let device: i64 = requested.parse().map_err(|err| {
        MiccheckError::config(format!("invalid device argument '{}': {}", requested, err))
    })?;

    if device < 0 || device >= i64::from(num_devices) {
        return Err(MiccheckError::config(
            "device cannot be greater than available devices or less than 0",
        ));
    }

    Ok(vec![device as u32])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_expands_in_ascending_order() {
        assert_eq!(resolve_devices("all", 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(resolve_devices("all", 0).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_single_device_in_range() {
        assert_eq!(resolve_devices("0", 2).unwrap(), vec![0]);
        assert_eq!(resolve_devices("1", 2).unwrap(), vec![1]);
    }

    #[test]
    fn test_out_of_range_is_a_config_error() {
        for requested in ["2", "7", "-1"] {
            let err = resolve_devices(requested, 2).unwrap_err();
            assert!(matches!(err, MiccheckError::Config { .. }), "{requested}");
        }
        // No devices at all: every explicit index is out of range.
        assert!(resolve_devices("0", 0).is_err());
    }

    #[test]
    fn test_non_integer_is_a_config_error() {
        let err = resolve_devices("mic0", 2).unwrap_err();
        assert!(matches!(err, MiccheckError::Config { .. }));
        assert!(err.to_string().contains("invalid device argument"));
    }
}
