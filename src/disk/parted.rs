use super::{allocate, device_name, display, DeviceGeometry, DiskError, DiskPlan, Partitions};
use crate::chroot::{Command, Executor};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Sector size that `/sys/block/<disk>/size` is always reported in.
const SYSFS_SECTOR: u64 = 512;

/// Writes disk plans to a device with the `parted` command line tool.
///
/// Device geometry is read from sysfs, which may be relocated for testing.
#[derive(Clone, Debug)]
pub struct Parted {
    sys_root: PathBuf,
}

impl Default for Parted {
    fn default() -> Self { Parted { sys_root: PathBuf::from("/") } }
}

impl Parted {
    pub fn with_sys_root<P: Into<PathBuf>>(sys_root: P) -> Self {
        Parted { sys_root: sys_root.into() }
    }

    /// Reads the sector size, length, and optimal alignment of a disk.
    pub fn geometry(&self, disk: &Path) -> Result<DeviceGeometry, DiskError> {
        let block = self.sys_root.join("sys/block").join(device_name(disk));

        let size = read_sys(&block.join("size"))?;
        let sector_size = read_sys(&block.join("queue/logical_block_size"))?;
        let optimal_io = read_sys(&block.join("queue/optimal_io_size")).unwrap_or(0);

        if sector_size == 0 {
            return Err(DiskError::SysfsParse {
                path:  display(block.join("queue/logical_block_size")),
                value: "0".into(),
            });
        }

        Ok(DeviceGeometry::new(
            sector_size,
            size * SYSFS_SECTOR / sector_size,
            DeviceGeometry::optimal_alignment(sector_size, optimal_io),
        ))
    }

    /// Wipes the partition table of the plan's disk, and writes the planned partitions.
    ///
    /// Returns the device paths of the new partitions, once the kernel has reread the table
    /// and udev has created their nodes.
    pub fn apply<E: Executor>(&self, exec: &mut E, plan: &DiskPlan) -> Result<Partitions, DiskError> {
        let geometry = self.geometry(&plan.disk)?;
        info!("{}: {:?}", plan.disk.display(), geometry);
        let regions = allocate(plan, &geometry)?;

        let disk = plan.disk.to_string_lossy();

        info!("{}: writing new GPT partition table", disk);
        exec.run(&parted(&disk, &["mklabel", "gpt"]))?;

        for (id, (spec, region)) in plan.partitions.iter().zip(regions.iter()).enumerate() {
            let start = format!("{}s", region.start);
            let end = format!("{}s", region.end);
            info!("{}: creating {} partition from {} to {}", disk, spec.role, start, end);
            exec.run(&parted(&disk, &[
                "mkpart",
                spec.role.name(),
                spec.filesystem.parted_name(),
                &start,
                &end,
            ]))?;

            if spec.bootable {
                let number = (id + 1).to_string();
                exec.run(&parted(&disk, &["set", &number, "esp", "on"]))?;
            }
        }

        exec.run(&cascade! {
            Command::new("blockdev");
            ..args(&["--flushbufs", "--rereadpt"]);
            ..arg(&*disk);
        })?;

        // Partition nodes are created by udev after the reread.
        exec.run(&cascade! {
            Command::new("udevadm");
            ..arg("settle");
        })?;

        Ok(Partitions::from_plan(plan))
    }
}

fn parted(disk: &str, args: &[&str]) -> Command {
    cascade! {
        Command::new("parted");
        ..args(&["--script", "--align", "optimal", disk]);
        ..args(args);
    }
}

fn read_sys(path: &Path) -> Result<u64, DiskError> {
    let value = fs::read_to_string(path)
        .map_err(|why| DiskError::SysfsRead { path: display(path), why })?;

    value
        .trim()
        .parse::<u64>()
        .map_err(|_| DiskError::SysfsParse { path: display(path), value: value.trim().to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_disk, Recorder};
    use crate::Firmware;
    use tempdir::TempDir;

    #[test]
    fn reads_geometry() {
        let root = TempDir::new("archinst-sysfs").unwrap();
        fake_disk(root.path(), "nvme0n1", 209_715_200, 4096);

        let geometry = Parted::with_sys_root(root.path()).geometry(Path::new("/dev/nvme0n1")).unwrap();
        assert_eq!(geometry, DeviceGeometry::new(4096, 209_715_200 / 8, 256));
    }

    #[test]
    fn missing_disk() {
        let root = TempDir::new("archinst-sysfs").unwrap();
        match Parted::with_sys_root(root.path()).geometry(Path::new("/dev/sdz")) {
            Err(DiskError::SysfsRead { path, .. }) => assert!(path.ends_with("sys/block/sdz/size")),
            other => panic!("expected a sysfs read error, got {:?}", other),
        }
    }

    #[test]
    fn writes_plan() {
        let root = TempDir::new("archinst-sysfs").unwrap();
        fake_disk(root.path(), "sda", 209_715_200, 512);

        let mut exec = Recorder::default();
        let plan = DiskPlan::new("/dev/sda", Firmware::Uefi, true);
        let partitions = Parted::with_sys_root(root.path()).apply(&mut exec, &plan).unwrap();

        assert_eq!(exec.commands(), vec![
            "parted --script --align optimal /dev/sda mklabel gpt",
            "parted --script --align optimal /dev/sda mkpart EFI fat32 2048s 1050623s",
            "parted --script --align optimal /dev/sda set 1 esp on",
            "parted --script --align optimal /dev/sda mkpart SWAP linux-swap 1050624s 5244927s",
            "parted --script --align optimal /dev/sda mkpart ROOT ext4 5244928s 209715165s",
            "blockdev --flushbufs --rereadpt /dev/sda",
            "udevadm settle",
        ]);

        assert_eq!(partitions.root().path, PathBuf::from("/dev/sda3"));
    }

    #[test]
    fn parted_failure_stops_partitioning() {
        let root = TempDir::new("archinst-sysfs").unwrap();
        fake_disk(root.path(), "sda", 209_715_200, 512);

        let mut exec = Recorder::default().fail_on("mkpart SWAP");
        let plan = DiskPlan::new("/dev/sda", Firmware::Bios, true);

        match Parted::with_sys_root(root.path()).apply(&mut exec, &plan) {
            Err(DiskError::Command { .. }) => (),
            other => panic!("expected a command error, got {:?}", other),
        }

        assert_eq!(exec.commands().len(), 2);
    }
}
