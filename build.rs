//! Build script for miccheck.
//!
//! Embeds the reference firmware versions the device checks compare against.
//! When `MICCHECK_FW_VERSION_FILE` points at a firmware `FW_Ver.h`, the SMC
//! and flash SPI versions are extracted from it; otherwise the packaged
//! defaults are used.

use std::env;
use std::fs;

const DEFAULT_FLASH_VERSION: &str = "2.1.02.0390";
const DEFAULT_SMC_FW_VERSION: &str = "1.16.5078";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MICCHECK_FW_VERSION_FILE");

    let header = env::var("MICCHECK_FW_VERSION_FILE")
        .ok()
        .and_then(|path| fs::read_to_string(path).ok());

    let flash = header
        .as_deref()
        .and_then(flash_version_from_header)
        .unwrap_or_else(|| DEFAULT_FLASH_VERSION.to_string());
    let smc = header
        .as_deref()
        .and_then(smc_version_from_header)
        .unwrap_or_else(|| DEFAULT_SMC_FW_VERSION.to_string());

    println!("cargo:rustc-env=MICCHECK_FLASH_VERSION={}", flash);
    println!("cargo:rustc-env=MICCHECK_SMC_FW_VERSION={}", smc);
}

/// Extract the single-quoted value following an identifier, e.g.
/// `#define SMC_Ver_Major '1'` yields `1`.
fn extract(text: &str, id: &str) -> Option<String> {
    let start = text.find(id)?;
    let rest = &text[start..];
    let open = rest.find('\'')?;
    let rest = &rest[open + 1..];
    let close = rest.find('\'')?;
    Some(rest[..close].to_string())
}

fn smc_version_from_header(text: &str) -> Option<String> {
    Some(format!(
        "{}.{}.{}",
        extract(text, "SMC_Ver_Major")?,
        extract(text, "SMC_Ver_Minor")?,
        extract(text, "SMC_Ver_Build")?
    ))
}

fn flash_version_from_header(text: &str) -> Option<String> {
    Some(format!(
        "{}.{}.{}.{}",
        extract(text, "SPI_Ver_Major")?,
        extract(text, "SPI_Ver_Minor")?,
        extract(text, "SPI_Ver_HotFix")?,
        extract(text, "SPI_Ver_Release")?
    ))
}
