//! Bringing the live system online, so that packages may be downloaded.

use crate::chroot::{Command, CommandError, Executor};

/// Host which is pinged to determine whether the live system is online.
pub const CONNECTIVITY_HOST: &str = "archlinux.org";

/// Returns `true` if a single ping to the connectivity host succeeds.
pub fn is_online<E: Executor>(exec: &mut E) -> bool {
    info!("checking internet connectivity");
    let command = cascade! {
        Command::new("ping");
        ..args(&["-c", "1", CONNECTIVITY_HOST]);
    };

    match exec.execute(&command.unchecked()) {
        Ok(output) => output.success(),
        Err(why) => {
            warn!("connectivity check could not be performed: {}", why);
            false
        }
    }
}

/// Requests a lease for wired interfaces.
pub fn dhcp<E: Executor>(exec: &mut E) -> Result<(), CommandError> {
    info!("configuring wired network with dhcpcd");
    exec.run(&Command::new("dhcpcd"))
}

/// Wireless interfaces as listed by `iwctl device list`.
pub fn wifi_devices<E: Executor>(exec: &mut E) -> Result<String, CommandError> {
    exec.stdout(&iwctl(&["device", "list"]))
}

/// Scans for networks with `device`, and returns the list of networks that were found.
pub fn wifi_scan<E: Executor>(exec: &mut E, device: &str) -> Result<String, CommandError> {
    exec.run(&iwctl(&["station", device, "scan"]))?;
    exec.stdout(&iwctl(&["station", device, "get-networks"]))
}

/// Connects `device` to the network named `ssid`. The passphrase is never logged.
pub fn wifi_connect<E: Executor>(
    exec: &mut E,
    device: &str,
    ssid: &str,
    passphrase: Option<&str>,
) -> Result<(), CommandError> {
    info!("connecting {} to {}", device, ssid);
    let mut command = iwctl(&["station", device, "connect", ssid]);
    if let Some(passphrase) = passphrase.filter(|pass| !pass.is_empty()) {
        command.arg("--passphrase").secret_arg(passphrase);
    }

    exec.run(&command)
}

fn iwctl(args: &[&str]) -> Command {
    cascade! {
        Command::new("iwctl");
        ..args(args);
    }
}
