//! Planning, partitioning, and probing of the target disk.

mod geometry;
mod parted;
mod partitions;
mod plan;
mod probe;

pub use self::{geometry::*, parted::*, partitions::*, plan::*, probe::*};

use crate::chroot::{Command, CommandError, Executor};
use failure::Fail;
use std::{io, path::{Path, PathBuf}};

#[derive(Debug, Fail)]
pub enum DiskError {
    #[fail(
        display = "not enough space for the {} partition: {} sectors required, {} available",
        role, required, available
    )]
    InsufficientSpace { role: PartitionRole, required: u64, available: u64 },
    #[fail(display = "unable to read {}: {}", path, why)]
    SysfsRead { path: String, why: io::Error },
    #[fail(display = "{} contains an invalid value: '{}'", path, value)]
    SysfsParse { path: String, value: String },
    #[fail(display = "unable to list block devices in {}: {}", path, why)]
    Probe { path: String, why: io::Error },
    #[fail(display = "{}", why)]
    Command { #[cause] why: CommandError },
}

impl From<CommandError> for DiskError {
    fn from(why: CommandError) -> Self { DiskError::Command { why } }
}

/// Hands the disk to `cfdisk`, so that the operator may partition it by hand.
pub fn cfdisk<E: Executor>(exec: &mut E, disk: &Path) -> Result<(), DiskError> {
    info!("launching cfdisk for manual partitioning of {}", disk.display());
    let command = cascade! {
        Command::new("cfdisk");
        ..arg(disk.to_string_lossy());
    };

    exec.run(&command.interactive()).map_err(DiskError::from)
}

fn display<P: AsRef<Path>>(path: P) -> String { path.as_ref().display().to_string() }

fn device_name(disk: &Path) -> PathBuf {
    disk.file_name().map_or_else(|| disk.to_path_buf(), PathBuf::from)
}
