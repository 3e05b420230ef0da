use super::{append_file, write_file};
use crate::chroot::{Command, Executor};
use crate::config::InstallConfig;
use crate::errors::InstallError;

/// Prepares pacman on the live system, installs the base system into the target with
/// `pacstrap`, and records the target's mounts in its `/etc/fstab`.
pub fn bootstrap<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    config: &InstallConfig,
    mut callback: F,
) -> Result<(), InstallError> {
    let system = &config.system;

    info!("initializing the pacman keyring");
    exec.run(&cascade! {
        Command::new("pacman-key");
        ..arg("--init");
    })?;
    exec.run(&cascade! {
        Command::new("pacman-key");
        ..args(&["--populate", "archlinux"]);
    })?;
    callback(10);

    // pacstrap copies the host's mirrorlist into the target.
    info!("using mirror {}", system.mirror);
    write_file(&system.host_mirrorlist, &format!("Server = {}\n", system.mirror))?;

    exec.run(&cascade! {
        Command::new("pacman");
        ..arg("-Sy");
    })?;
    callback(20);

    let target = system.target.to_string_lossy();
    info!("installing {:?} to {}", system.base_packages, target);
    exec.run(&cascade! {
        Command::new("pacstrap");
        ..arg(&*target);
        ..args(&system.base_packages);
    })?;
    callback(90);

    info!("generating {}/etc/fstab", target);
    let fstab = exec.stdout(&cascade! {
        Command::new("genfstab");
        ..arg("-U");
        ..arg(&*target);
    })?;

    append_file(&system.target.join("etc/fstab"), &fstab)?;
    callback(100);

    Ok(())
}
