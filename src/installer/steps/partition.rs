use crate::chroot::Executor;
use crate::config::{DiskLayout, InstallConfig};
use crate::disk::{DiskPlan, Parted, Partitions};
use crate::errors::InstallError;

/// Creates the partitions of an automatic layout, or assigns roles to those of a manual one.
pub fn partition<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    parted: &Parted,
    config: &InstallConfig,
    mut callback: F,
) -> Result<Partitions, InstallError> {
    let partitions = match config.layout {
        DiskLayout::Automatic { swap } => {
            let plan = DiskPlan::new(config.disk.clone(), config.firmware, swap);
            info!("{}: applying {:?}", config.disk.display(), plan.partitions);
            callback(10);
            parted.apply(exec, &plan)?
        }
        DiskLayout::Manual(ref paths) => {
            info!("{}: using manually created partitions {:?}", config.disk.display(), paths);
            Partitions::from_manual(paths, config.firmware)?
        }
    };

    for part in partitions.iter() {
        info!("{} partition: {}", part.role, part.path.display());
    }

    callback(100);
    Ok(partitions)
}
