use super::{DiskPlan, FileSystem, PartitionRole};
use crate::{config::ValidationError, Firmware};
use std::path::{Path, PathBuf};

/// A partition device on the target disk, and the role it will serve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub role: PartitionRole,
    pub path: PathBuf,
}

impl Partition {
    pub fn new<P: Into<PathBuf>>(role: PartitionRole, path: P) -> Self {
        Partition { role, path: path.into() }
    }

    pub fn filesystem(&self) -> FileSystem { FileSystem::for_role(self.role) }
}

/// The partitions of the target disk, in on-disk order.
///
/// There is always exactly one root partition. Every other component finds the
/// partitions it needs by their role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partitions {
    parts: Vec<Partition>,
    root:  usize,
}

impl Partitions {
    /// The device paths that the kernel assigns after the plan has been written.
    pub fn from_plan(plan: &DiskPlan) -> Self {
        let parts: Vec<Partition> = plan
            .partitions
            .iter()
            .enumerate()
            .map(|(id, spec)| Partition::new(spec.role, partition_path(&plan.disk, id as u32 + 1)))
            .collect();

        let root = parts.iter().position(|part| part.role == PartitionRole::Root).unwrap_or(0);
        Partitions { parts, root }
    }

    /// Assigns roles to partitions which the operator created by hand.
    ///
    /// The last partition is the root. Under UEFI, the first is the EFI system partition.
    /// A swap partition is expected second when three partitions are given, or first
    /// when two are given on a BIOS system. Anything else is an extra data partition.
    pub fn from_manual<S: AsRef<str>>(
        paths: &[S],
        firmware: Firmware,
    ) -> Result<Self, ValidationError> {
        if paths.is_empty() {
            return Err(ValidationError::NoPartitions);
        }

        let count = paths.len();
        let root = count - 1;
        let parts = paths
            .iter()
            .enumerate()
            .map(|(id, path)| {
                let role = if id == root {
                    PartitionRole::Root
                } else if id == 0 && firmware.is_uefi() {
                    PartitionRole::Efi
                } else if (count == 3 && id == 1) || (count == 2 && id == 0 && !firmware.is_uefi())
                {
                    PartitionRole::Swap
                } else {
                    PartitionRole::Data
                };

                Partition::new(role, path.as_ref())
            })
            .collect();

        Ok(Partitions { parts, root })
    }

    /// Parses a whitespace-separated list of device paths, such as `/dev/sda1 /dev/sda2`.
    pub fn parse_manual(input: &str, firmware: Firmware) -> Result<Self, ValidationError> {
        let paths: Vec<&str> = input.split_whitespace().collect();
        Partitions::from_manual(&paths, firmware)
    }

    pub fn root(&self) -> &Partition { &self.parts[self.root] }

    pub fn efi(&self) -> Option<&Partition> { self.find(PartitionRole::Efi) }

    pub fn swap(&self) -> Option<&Partition> { self.find(PartitionRole::Swap) }

    pub fn find(&self, role: PartitionRole) -> Option<&Partition> {
        self.parts.iter().find(|part| part.role == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> { self.parts.iter() }

    pub fn len(&self) -> usize { self.parts.len() }

    pub fn is_empty(&self) -> bool { self.parts.is_empty() }
}

/// The device path of partition `number` on `disk`.
///
/// Disks whose names end with a digit, such as `nvme0n1` and `mmcblk0`, separate the
/// partition number with a `p`.
pub fn partition_path(disk: &Path, number: u32) -> PathBuf {
    let disk = disk.to_string_lossy();
    if disk.ends_with(|c: char| c.is_ascii_digit()) {
        PathBuf::from(format!("{}p{}", disk, number))
    } else {
        PathBuf::from(format!("{}{}", disk, number))
    }
}
