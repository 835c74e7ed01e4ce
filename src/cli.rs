use clap::{ArgAction, Parser};

/// Command line surface.
///
/// Each check gets one boolean flag. The flag name alone enables the check
/// (`--ping` is `--ping true`); default-on checks can be switched off with an
/// explicit value (`--smc-ver false`). Positional arguments are rejected by
/// clap with a usage error.
#[derive(Parser, Debug)]
#[command(name = "miccheck")]
#[command(version)]
#[command(about = "Performs software sanity checks on a host machine with \
Intel(R) Xeon Phi(TM) coprocessors installed, by running a suite of \
diagnostic tests. By default, a subset of all available tests are run; \
additional tests can be enabled individually. All enabled host tests run \
first, then the device tests for each selected coprocessor in turn.")]
pub struct Cli {
    /// Enables verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Select device on which to run ("all" or a single zero-based index)
    #[arg(short, long, default_value = "all")]
    pub device: String,

    /// Output format for the final report (pretty, json, or yaml)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Check whether Intel(R) Xeon Phi(TM) coprocessors are detected over PCI
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub pci_numdev: bool,

    /// Check whether the mic driver is loaded in the host
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub driver_loaded: bool,

    /// Check whether the driver detected the same number of devices as PCI
    /// enumeration did
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub driver_numdev: bool,

    /// Check whether the MPSS daemon is running
    #[cfg(target_os = "linux")]
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub mpssd_loaded: bool,

    /// Check whether the loaded driver version is correct
    #[arg(long, default_value_t = false, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub driver_ver: bool,

    /// Check whether the device state is online and its postcode is FF
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub dev_state: bool,

    /// Check whether the RAS daemon is available in the device
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub dev_rasdaemon: bool,

    /// Check whether the running flash version of the device is correct
    #[cfg(target_os = "linux")]
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub flash_ver: bool,

    /// Check whether the running SMC firmware version of the device is correct
    #[arg(long, default_value_t = true, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub smc_ver: bool,

    /// Check whether the network interface of the device can be pinged
    #[cfg(target_os = "linux")]
    #[arg(long, default_value_t = false, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub ping: bool,

    /// Check whether the network interface of the device can be accessed
    /// through ssh
    #[cfg(target_os = "linux")]
    #[arg(long, default_value_t = false, action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true")]
    pub ssh: bool,
}
