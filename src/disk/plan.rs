use crate::Firmware;
use derive_new::new;
use std::{fmt, path::PathBuf};

pub const MIB: u64 = 1024 * 1024;
pub const GIB: u64 = 1024 * MIB;

/// Size of the EFI system partition.
pub const EFI_SIZE: u64 = 512 * MIB;
/// Size of the swap partition, when one is requested.
pub const SWAP_SIZE: u64 = 2 * GIB;

/// The purpose a partition serves in the installed system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartitionRole {
    Efi,
    Swap,
    Root,
    /// Any additional partition from a manual layout. It is formatted, but never mounted.
    Data,
}

impl PartitionRole {
    /// The GPT partition name given to partitions with this role.
    pub fn name(self) -> &'static str {
        match self {
            PartitionRole::Efi => "EFI",
            PartitionRole::Swap => "SWAP",
            PartitionRole::Root => "ROOT",
            PartitionRole::Data => "DATA",
        }
    }
}

impl fmt::Display for PartitionRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizePolicy {
    /// A fixed size in bytes, independent of the size of the disk.
    Fixed(u64),
    /// Everything left on the disk after the preceding partitions.
    Remaining,
}

/// Describes a file system format, such as ext4 or fat32.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FileSystem {
    Fat32,
    Swap,
    Ext4,
}

impl FileSystem {
    /// The file system type that parted records for the partition.
    pub fn parted_name(self) -> &'static str {
        match self {
            FileSystem::Fat32 => "fat32",
            FileSystem::Swap => "linux-swap",
            FileSystem::Ext4 => "ext4",
        }
    }

    /// The file system which a partition of the given role is formatted with.
    pub fn for_role(role: PartitionRole) -> Self {
        match role {
            PartitionRole::Efi => FileSystem::Fat32,
            PartitionRole::Swap => FileSystem::Swap,
            PartitionRole::Root | PartitionRole::Data => FileSystem::Ext4,
        }
    }
}

impl fmt::Display for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            FileSystem::Fat32 => "fat32",
            FileSystem::Swap => "swap",
            FileSystem::Ext4 => "ext4",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, new)]
pub struct PartitionSpec {
    pub role:       PartitionRole,
    pub size:       SizePolicy,
    pub filesystem: FileSystem,
    pub bootable:   bool,
}

/// The partitions which will be written to a freshly-labeled disk, in on-disk order.
///
/// A plan always ends with exactly one root partition, and begins with an EFI system
/// partition if, and only if, the system was booted with UEFI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskPlan {
    pub disk:       PathBuf,
    pub partitions: Vec<PartitionSpec>,
}

impl DiskPlan {
    pub fn new<P: Into<PathBuf>>(disk: P, firmware: Firmware, swap: bool) -> Self {
        let mut partitions = Vec::with_capacity(3);

        if firmware.is_uefi() {
            partitions.push(PartitionSpec::new(
                PartitionRole::Efi,
                SizePolicy::Fixed(EFI_SIZE),
                FileSystem::Fat32,
                true,
            ));
        }

        if swap {
            partitions.push(PartitionSpec::new(
                PartitionRole::Swap,
                SizePolicy::Fixed(SWAP_SIZE),
                FileSystem::Swap,
                false,
            ));
        }

        partitions.push(PartitionSpec::new(
            PartitionRole::Root,
            SizePolicy::Remaining,
            FileSystem::Ext4,
            false,
        ));

        DiskPlan { disk: disk.into(), partitions }
    }
}
