use super::{display, DiskError};
use crate::config::ValidationError;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

/// Block devices which can never be an installation target.
const IGNORED_PREFIXES: &[&str] = &["loop", "ram", "zram", "sr", "fd", "dm-"];

/// A whole disk which may be selected as the installation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDisk {
    /// Kernel name of the device, such as `sda` or `nvme0n1`.
    pub name: String,
    /// Capacity in bytes, if sysfs reported it.
    pub size: Option<u64>,
}

impl BlockDisk {
    pub fn path(&self) -> PathBuf { Path::new("/dev").join(&self.name) }
}

impl fmt::Display for BlockDisk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

        match self.size {
            Some(bytes) => write!(f, "{} ({:.1} GiB)", self.name, bytes as f64 / GIB),
            None => f.write_str(&self.name),
        }
    }
}

/// Lists the disks of the running system which are eligible installation targets.
pub fn list_disks() -> Result<Vec<BlockDisk>, DiskError> { list_disks_in("/") }

/// Lists the eligible disks found under `root/sys/block`.
pub fn list_disks_in<P: AsRef<Path>>(root: P) -> Result<Vec<BlockDisk>, DiskError> {
    let block = root.as_ref().join("sys/block");
    info!("probing disks in {}", block.display());

    let entries = fs::read_dir(&block)
        .map_err(|why| DiskError::Probe { path: display(&block), why })?;

    let mut disks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|why| DiskError::Probe { path: display(&block), why })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            debug!("skipping block device {}", name);
            continue;
        }

        let size = fs::read_to_string(entry.path().join("size"))
            .ok()
            .and_then(|size| size.trim().parse::<u64>().ok())
            .map(|sectors| sectors * 512);

        disks.push(BlockDisk { name, size });
    }

    disks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(disks)
}

/// Accepts the operator's choice of disk, given as either `sda` or `/dev/sda`, if it is
/// one of the listed disks. Returns the device path of the disk.
pub fn validate_disk(choice: &str, disks: &[BlockDisk]) -> Result<PathBuf, ValidationError> {
    let choice = choice.trim();
    let name = choice.trim_start_matches("/dev/");

    disks.iter().find(|disk| disk.name == name).map(BlockDisk::path).ok_or_else(|| {
        ValidationError::DiskNotFound {
            disk:      choice.to_owned(),
            available: disks.iter().map(|disk| disk.name.as_str()).collect::<Vec<_>>().join(", "),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_disk;
    use tempdir::TempDir;

    fn sysfs() -> TempDir {
        let root = TempDir::new("archinst-sysfs").unwrap();
        for name in &["sda", "nvme0n1", "loop0", "sr0", "zram0", "dm-0", "ram1", "fd0"] {
            fake_disk(root.path(), name, 2048, 512);
        }
        root
    }

    #[test]
    fn lists_eligible_disks() {
        let root = sysfs();
        let disks = list_disks_in(root.path()).unwrap();
        let names: Vec<&str> = disks.iter().map(|disk| disk.name.as_str()).collect();
        assert_eq!(names, vec!["nvme0n1", "sda"]);
        assert_eq!(disks[1].size, Some(1024 * 1024));
        assert_eq!(disks[1].path(), PathBuf::from("/dev/sda"));
    }

    #[test]
    fn missing_sysfs() {
        let root = TempDir::new("archinst-empty").unwrap();
        assert!(list_disks_in(root.path()).is_err());
    }

    #[test]
    fn disk_selection() {
        let root = sysfs();
        let disks = list_disks_in(root.path()).unwrap();

        assert_eq!(validate_disk("sda", &disks), Ok(PathBuf::from("/dev/sda")));
        assert_eq!(validate_disk(" /dev/nvme0n1\n", &disks), Ok(PathBuf::from("/dev/nvme0n1")));
        assert_eq!(
            validate_disk("loop0", &disks),
            Err(ValidationError::DiskNotFound {
                disk:      "loop0".into(),
                available: "nvme0n1, sda".into(),
            })
        );
    }

    #[test]
    fn display_size() {
        let disk = BlockDisk { name: "vda".into(), size: Some(20 * 1024 * 1024 * 1024) };
        assert_eq!(disk.to_string(), "vda (20.0 GiB)");
    }
}
