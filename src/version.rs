//! Build-time reference versions and the version comparison rule used by the
//! driver and firmware checks.

/// Reference versions embedded at compile time, injected into the
/// orchestrator rather than read from ambient globals.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// The miccheck release version, which tracks the driver stack release.
    pub version: String,
    /// Reference flash SPI version for the coprocessor.
    pub flash_version: String,
    /// Reference SMC firmware version for the coprocessor.
    pub smc_firmware_version: String,
}

impl BuildInfo {
    /// The versions baked in by `build.rs`.
    pub fn from_build() -> Self {
        BuildInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            flash_version: env!("MICCHECK_FLASH_VERSION").to_string(),
            smc_firmware_version: env!("MICCHECK_SMC_FW_VERSION").to_string(),
        }
    }
}

/// Compare two dotted version strings as numeric tuples.
///
/// They match if the tuples are exactly equal, or if truncating both to
/// their first two components yields equal tuples — a differing patch level
/// is tolerated, a differing minor version is not. An empty string on either
/// side never matches.
pub fn versions_match(reference: &str, actual: &str) -> bool {
    if reference.is_empty() || actual.is_empty() {
        return false;
    }

    let reference = components(reference);
    let actual = components(actual);

    if reference == actual {
        return true;
    }

    reference.iter().take(2).eq(actual.iter().take(2))
}

/// Split a dotted version into numeric components. Each component
/// contributes its leading decimal digits, so `40+git` counts as `40`.
fn components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}
