use crate::desktop::DesktopEnvironment;
use crate::hostname;
use crate::installer::BootloaderChoice;
use crate::Firmware;
use failure::Fail;
use smart_default::SmartDefault;
use std::{fmt, path::PathBuf};

/// The reason an installer configuration was rejected.
#[derive(Debug, Fail, PartialEq)]
pub enum ValidationError {
    #[fail(display = "'{}' is not a valid hostname", hostname)]
    InvalidHostname { hostname: String },
    #[fail(display = "'{}' is not a valid user name", username)]
    InvalidUsername { username: String },
    #[fail(display = "the account password is empty")]
    EmptyPassword,
    #[fail(display = "disk '{}' is not one of the available disks: {}", disk, available)]
    DiskNotFound { disk: String, available: String },
    #[fail(display = "no partitions were supplied for the manual layout")]
    NoPartitions,
}

/// A password which is never displayed or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new<S: Into<String>>(password: S) -> Self { Password(password.into()) }

    /// Access the password itself, so that it may be handed to a tool over stdin.
    pub fn expose(&self) -> &str { &self.0 }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str("Password(********)") }
}

/// Credentials for the administrative user account. The same password is
/// assigned to `root`.
#[derive(Clone, Debug)]
pub struct UserAccount {
    pub username: String,
    pub password: Password,
}

/// How the target disk will be divided into partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiskLayout {
    /// Wipe the disk and plan the partitions automatically.
    Automatic { swap: bool },
    /// The operator has already partitioned the disk, and supplied these device paths.
    Manual(Vec<String>),
}

/// Settings which are rarely changed from their defaults.
#[derive(Clone, Debug, SmartDefault)]
pub struct SystemSettings {
    /// Where the root partition of the new system is mounted.
    #[default(PathBuf::from("/mnt"))]
    pub target: PathBuf,
    /// Zone name relative to `/usr/share/zoneinfo`.
    #[default(String::from("UTC"))]
    pub timezone: String,
    #[default(String::from("en_US.UTF-8"))]
    pub locale: String,
    /// Written to the live system's mirrorlist, which `pacstrap` copies into the target.
    #[default(String::from("https://geo.mirror.pkgbuild.com/$repo/os/$arch"))]
    pub mirror: String,
    #[default(PathBuf::from("/etc/pacman.d/mirrorlist"))]
    pub host_mirrorlist: PathBuf,
    #[default(vec!["base".into(), "linux".into(), "linux-firmware".into()])]
    pub base_packages: Vec<String>,
}

/// Installer configuration, collected from the operator before any changes are made.
#[derive(Clone, Debug)]
pub struct InstallConfig {
    pub firmware:   Firmware,
    /// Device path of the target disk, such as `/dev/sda`.
    pub disk:       PathBuf,
    pub layout:     DiskLayout,
    pub desktop:    DesktopEnvironment,
    pub bootloader: BootloaderChoice,
    pub hostname:   String,
    pub account:    UserAccount,
    pub system:     SystemSettings,
}

impl InstallConfig {
    /// Reject configurations that would be guaranteed to fail part-way through.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !hostname::is_valid(&self.hostname) {
            return Err(ValidationError::InvalidHostname { hostname: self.hostname.clone() });
        }

        if !is_valid_username(&self.account.username) {
            return Err(ValidationError::InvalidUsername {
                username: self.account.username.clone(),
            });
        }

        if self.account.password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }

        if let DiskLayout::Manual(ref paths) = self.layout {
            if paths.is_empty() {
                return Err(ValidationError::NoPartitions);
            }
        }

        Ok(())
    }
}

/// Lowercase POSIX login names, as accepted by `useradd` without `--badname`.
pub fn is_valid_username(username: &str) -> bool {
    const MAX_USERNAME: usize = 32;

    let name = username.strip_suffix('$').unwrap_or(username);
    let mut bytes = name.bytes();
    let first_ok = bytes.next().map_or(false, |b| b.is_ascii_lowercase() || b == b'_');

    first_ok
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        && username.len() <= MAX_USERNAME
        && username != "root"
}
