use super::{DiskError, DiskPlan, PartitionRole, SizePolicy, MIB};
use derive_new::new;

/// Bytes reserved for the GPT partition entry array, at both ends of the disk.
const GPT_ENTRIES: u64 = 16 * 1024;

/// Physical characteristics of a disk, measured in logical sectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, new)]
pub struct DeviceGeometry {
    /// Size of each logical sector, in bytes.
    pub sector_size: u64,
    /// Total number of logical sectors on the device.
    pub length:      u64,
    /// Partition starts are aligned to multiples of this many sectors.
    pub alignment:   u64,
}

impl DeviceGeometry {
    /// Computes the optimal alignment, in sectors, of a device.
    ///
    /// Partitions are aligned to 1 MiB, unless the device reports an optimal I/O size
    /// which 1 MiB is not a multiple of, in which case that size is used instead.
    pub fn optimal_alignment(sector_size: u64, optimal_io_size: u64) -> u64 {
        let bytes = if optimal_io_size != 0 && MIB % optimal_io_size != 0 {
            optimal_io_size
        } else {
            MIB
        };

        (bytes / sector_size.max(1)).max(1)
    }

    /// Sectors occupied by a copy of the GPT partition entry array.
    fn entry_sectors(&self) -> u64 { GPT_ENTRIES / self.sector_size.max(1) }

    /// First sector following the protective MBR, the primary header, and its entries.
    pub fn first_usable(&self) -> u64 { 2 + self.entry_sectors() }

    /// Last sector preceding the backup entries and backup header.
    pub fn last_usable(&self) -> u64 { self.length.saturating_sub(2 + self.entry_sectors()) }

    pub fn align_up(&self, sector: u64) -> u64 {
        let alignment = self.alignment.max(1);
        match sector % alignment {
            0 => sector,
            rem => sector + (alignment - rem),
        }
    }

    /// Number of sectors required to hold `bytes`.
    pub fn sectors_for(&self, bytes: u64) -> u64 {
        let sector_size = self.sector_size.max(1);
        (bytes + sector_size - 1) / sector_size
    }
}

/// A span of sectors assigned to a partition. Both ends are inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, new)]
pub struct Region {
    pub role:  PartitionRole,
    pub start: u64,
    pub end:   u64,
}

impl Region {
    pub fn sectors(&self) -> u64 { self.end - self.start + 1 }
}

/// Assigns a region of the disk to each partition of the plan, in order.
///
/// Every region begins on an aligned sector. Fixed partitions occupy exactly the number of
/// sectors their size requires, and the remaining partition extends to one sector before
/// the last usable sector of the GPT.
pub fn allocate(plan: &DiskPlan, geometry: &DeviceGeometry) -> Result<Vec<Region>, DiskError> {
    let limit = geometry.last_usable().saturating_sub(1);
    let mut start = geometry.align_up(geometry.first_usable());
    let mut regions = Vec::with_capacity(plan.partitions.len());

    for spec in &plan.partitions {
        let available = (limit + 1).saturating_sub(start);
        let required = match spec.size {
            SizePolicy::Fixed(bytes) => geometry.sectors_for(bytes).max(1),
            SizePolicy::Remaining => 1,
        };

        if required > available {
            return Err(DiskError::InsufficientSpace { role: spec.role, required, available });
        }

        let end = match spec.size {
            SizePolicy::Fixed(_) => start + required - 1,
            SizePolicy::Remaining => limit,
        };

        debug!("allocated {} partition at sectors {}..{}", spec.role, start, end);
        regions.push(Region::new(spec.role, start, end));
        start = geometry.align_up(end + 1);
    }

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{EFI_SIZE, SWAP_SIZE};
    use crate::Firmware;

    const SECTORS_100G: u64 = 209_715_200;

    fn geometry(sector_size: u64, bytes: u64) -> DeviceGeometry {
        DeviceGeometry::new(
            sector_size,
            bytes / sector_size,
            DeviceGeometry::optimal_alignment(sector_size, 0),
        )
    }

    #[test]
    fn alignment() {
        assert_eq!(DeviceGeometry::optimal_alignment(512, 0), 2048);
        assert_eq!(DeviceGeometry::optimal_alignment(4096, 0), 256);
        assert_eq!(DeviceGeometry::optimal_alignment(512, 4096), 2048);
        assert_eq!(DeviceGeometry::optimal_alignment(512, 3 * 512 * 1024), 3072);
    }

    #[test]
    fn gpt_bounds() {
        let geometry = geometry(512, SECTORS_100G * 512);
        assert_eq!(geometry.first_usable(), 34);
        assert_eq!(geometry.last_usable(), SECTORS_100G - 34);

        let geometry = DeviceGeometry::new(4096, 1_000_000, 256);
        assert_eq!(geometry.first_usable(), 6);
        assert_eq!(geometry.last_usable(), 1_000_000 - 6);
    }

    #[test]
    fn uefi_with_swap() {
        let plan = DiskPlan::new("/dev/sda", Firmware::Uefi, true);
        let regions = allocate(&plan, &geometry(512, SECTORS_100G * 512)).unwrap();

        assert_eq!(
            regions,
            vec![
                Region::new(PartitionRole::Efi, 2048, 1_050_623),
                Region::new(PartitionRole::Swap, 1_050_624, 5_244_927),
                Region::new(PartitionRole::Root, 5_244_928, 209_715_165),
            ]
        );
    }

    #[test]
    fn fixed_sizes_do_not_depend_on_disk_size() {
        let plan = DiskPlan::new("/dev/sda", Firmware::Uefi, true);
        for &gib in &[8u64, 64, 2048] {
            let geometry = geometry(512, gib * 1024 * 1024 * 1024);
            let regions = allocate(&plan, &geometry).unwrap();
            assert_eq!(regions[0].sectors() * 512, EFI_SIZE);
            assert_eq!(regions[1].sectors() * 512, SWAP_SIZE);
            assert_eq!(regions[2].end, geometry.last_usable() - 1);

            for region in &regions {
                assert_eq!(region.start % geometry.alignment, 0, "{:?}", region);
            }

            for pair in regions.windows(2) {
                assert!(pair[0].end < pair[1].start);
            }
        }
    }

    #[test]
    fn bios_root_only() {
        let plan = DiskPlan::new("/dev/vda", Firmware::Bios, false);
        let regions = allocate(&plan, &geometry(512, 20 * 1024 * 1024 * 1024)).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].role, PartitionRole::Root);
        assert_eq!(regions[0].start, 2048);
    }

    #[test]
    fn four_kib_sectors() {
        let plan = DiskPlan::new("/dev/nvme0n1", Firmware::Uefi, false);
        let geometry = geometry(4096, 100 * 1024 * 1024 * 1024);
        let regions = allocate(&plan, &geometry).unwrap();

        assert_eq!(regions[0], Region::new(PartitionRole::Efi, 256, 256 + 131_072 - 1));
        assert_eq!(regions[1].start, 131_328);
        assert_eq!(regions[1].end, geometry.length - 7);
    }

    #[test]
    fn insufficient_space() {
        let plan = DiskPlan::new("/dev/sdb", Firmware::Uefi, true);
        match allocate(&plan, &geometry(512, 1024 * 1024 * 1024)) {
            Err(DiskError::InsufficientSpace { role, required, .. }) => {
                assert_eq!(role, PartitionRole::Swap);
                assert_eq!(required, SWAP_SIZE / 512);
            }
            other => panic!("expected insufficient space, got {:?}", other),
        }

        // The EFI partition fits exactly, leaving nothing for the root.
        let plan = DiskPlan::new("/dev/sdb", Firmware::Uefi, false);
        let geometry = DeviceGeometry::new(512, 1_050_658, 2048);
        match allocate(&plan, &geometry) {
            Err(DiskError::InsufficientSpace { role, .. }) => assert_eq!(role, PartitionRole::Root),
            other => panic!("expected insufficient space, got {:?}", other),
        }
    }
}
