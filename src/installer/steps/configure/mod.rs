mod chroot_conf;

pub use self::chroot_conf::ChrootConfigurator;

use super::bootloader;
use crate::chroot::{ArchChroot, Executor};
use crate::config::InstallConfig;
use crate::disk::Partitions;
use crate::errors::InstallError;

/// Applies the system configuration to the bootstrapped target, and then installs the
/// bootloader. Each change is applied in order, and the first failure aborts the step.
pub fn configure<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    config: &InstallConfig,
    partitions: &Partitions,
    mut callback: F,
) -> Result<(), InstallError> {
    let system = &config.system;
    let account = &config.account;

    {
        let mut chroot =
            ChrootConfigurator::new(&mut *exec, ArchChroot::new(system.target.as_path()));

        chroot.hostname(&config.hostname)?;
        chroot.hosts(&config.hostname)?;
        callback(10);

        chroot.timezone(&system.timezone)?;
        callback(20);

        chroot.locale(&system.locale)?;
        callback(40);

        chroot.set_password("root", &account.password)?;
        chroot.create_user(&account.username, &account.password)?;
        chroot.wheel_sudo()?;
        callback(60);

        chroot.install(&["networkmanager"])?;
        chroot.enable_service("NetworkManager")?;
        callback(75);
    }

    bootloader(exec, config, partitions)?;
    callback(100);

    Ok(())
}
