//! A crate for installing Arch Linux onto a disk from the live environment.
//!
//! Every external tool is invoked through an [`Executor`](chroot::Executor), and the
//! installation itself is driven by the [`Installer`].

#[macro_use]
extern crate cascade;
#[macro_use]
extern crate log;

pub use archinst_chroot as chroot;
pub use archinst_firmware::Firmware;

pub mod config;
pub mod desktop;
pub mod disk;
mod errors;
pub mod hostname;
mod installer;
mod logging;
pub mod network;

#[cfg(test)]
mod testing;

pub use self::{
    config::{DiskLayout, InstallConfig, Password, SystemSettings, UserAccount, ValidationError},
    desktop::DesktopEnvironment,
    disk::{BlockDisk, DiskError, Partitions},
    errors::{InstallError, IoContext},
    installer::{BootRoutine, BootloaderChoice, Error, Installer, Status, Step},
    logging::log,
};

use std::sync::atomic::AtomicBool;

/// Set by the operator's interrupt. No further steps are started once it is set.
pub static KILL_SWITCH: AtomicBool = AtomicBool::new(false);
