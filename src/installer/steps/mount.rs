use crate::chroot::{Command, Executor};
use crate::disk::Partitions;
use crate::errors::{InstallError, IoContext};
use std::{fs, path::Path};

/// Mounts the root partition at the target, followed by the EFI partition at `/boot`.
pub fn mount<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    partitions: &Partitions,
    target: &Path,
    mut callback: F,
) -> Result<(), InstallError> {
    let root = partitions.root();
    info!("mounting {} to {}", root.path.display(), target.display());
    exec.run(&mount_cmd(&root.path, target))?;
    callback(50);

    if let Some(efi) = partitions.efi() {
        let boot = target.join("boot");
        fs::create_dir_all(&boot)
            .with_context(|| format!("unable to create {}", boot.display()))?;

        info!("mounting {} to {}", efi.path.display(), boot.display());
        exec.run(&mount_cmd(&efi.path, &boot))?;
    }

    callback(100);
    Ok(())
}

/// Recursively unmounts everything beneath the target.
pub fn unmount<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    target: &Path,
    mut callback: F,
) -> Result<(), InstallError> {
    info!("unmounting {}", target.display());
    exec.run(&cascade! {
        Command::new("umount");
        ..arg("-R");
        ..arg(target.to_string_lossy());
    })?;

    callback(100);
    Ok(())
}

fn mount_cmd(source: &Path, target: &Path) -> Command {
    cascade! {
        Command::new("mount");
        ..arg(source.to_string_lossy());
        ..arg(target.to_string_lossy());
    }
}
