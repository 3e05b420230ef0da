use super::ChrootConfigurator;
use crate::chroot::{ArchChroot, Executor};
use crate::config::InstallConfig;
use crate::errors::InstallError;

/// Installs the selected desktop environment with Xorg, and enables its display manager.
pub fn desktop<E: Executor, F: FnMut(i32)>(
    exec: &mut E,
    config: &InstallConfig,
    mut callback: F,
) -> Result<(), InstallError> {
    let desktop = config.desktop;
    if desktop.packages().is_empty() {
        info!("no desktop environment will be installed");
        callback(100);
        return Ok(());
    }

    info!("installing the {} desktop environment", desktop);
    let mut conf = ChrootConfigurator::new(exec, ArchChroot::new(config.system.target.as_path()));

    let mut packages = desktop.packages().to_vec();
    packages.push("xorg");
    conf.install(&packages)?;
    callback(90);

    if let Some(unit) = desktop.display_manager() {
        conf.enable_service(unit)?;
    }

    callback(100);
    Ok(())
}
