use crate::chroot::{Command, Executor};
use crate::disk::{FileSystem, Partitions};
use crate::errors::InstallError;

/// Formats every partition with the file system of its role, in on-disk order.
///
/// Swap partitions are activated as soon as they are created.
pub fn format<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    partitions: &Partitions,
    mut callback: F,
) -> Result<(), InstallError> {
    let total = partitions.len().max(1);

    for (id, part) in partitions.iter().enumerate() {
        let path = part.path.to_string_lossy();
        let kind = part.filesystem();
        info!("formatting {} partition {} with {}", part.role, path, kind);

        let (cmd, args): (&'static str, &'static [&'static str]) = match kind {
            FileSystem::Fat32 => ("mkfs.fat", &["-F32"]),
            FileSystem::Swap => ("mkswap", &[]),
            FileSystem::Ext4 => ("mkfs.ext4", &["-F"]),
        };

        exec.run(&cascade! {
            Command::new(cmd);
            ..args(args);
            ..arg(&*path);
        })?;

        if kind == FileSystem::Swap {
            exec.run(&cascade! {
                Command::new("swapon");
                ..arg(&*path);
            })?;
        }

        callback(((id + 1) * 100 / total) as i32);
    }

    Ok(())
}
