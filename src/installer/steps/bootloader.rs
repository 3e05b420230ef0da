use super::{write_file, ChrootConfigurator};
use crate::chroot::{ArchChroot, Command, Executor};
use crate::config::InstallConfig;
use crate::disk::Partitions;
use crate::errors::InstallError;
use crate::Firmware;
use std::{env, fmt, path::Path};

/// The bootloader requested by the operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BootloaderChoice {
    Grub,
    SystemdBoot,
    Refind,
}

impl BootloaderChoice {
    pub const ALL: [BootloaderChoice; 3] =
        [BootloaderChoice::Grub, BootloaderChoice::SystemdBoot, BootloaderChoice::Refind];

    /// systemd-boot and rEFInd are only able to boot UEFI systems.
    pub fn supports(self, firmware: Firmware) -> bool {
        self == BootloaderChoice::Grub || firmware.is_uefi()
    }
}

impl Default for BootloaderChoice {
    fn default() -> Self { BootloaderChoice::Grub }
}

impl fmt::Display for BootloaderChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            BootloaderChoice::Grub => "GRUB",
            BootloaderChoice::SystemdBoot => "systemd-boot",
            BootloaderChoice::Refind => "rEFInd",
        })
    }
}

/// The installation routine which will actually be performed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BootRoutine {
    GrubBios,
    GrubEfi,
    SystemdBoot,
    Refind,
}

impl BootRoutine {
    /// Choices which the firmware cannot boot fall back to GRUB.
    pub fn select(firmware: Firmware, choice: BootloaderChoice) -> Self {
        match (firmware, choice) {
            (Firmware::Bios, BootloaderChoice::Grub) => BootRoutine::GrubBios,
            (Firmware::Bios, unsupported) => {
                warn!("{} is not supported in BIOS mode: installing GRUB instead", unsupported);
                BootRoutine::GrubBios
            }
            (Firmware::Uefi, BootloaderChoice::Grub) => BootRoutine::GrubEfi,
            (Firmware::Uefi, BootloaderChoice::SystemdBoot) => BootRoutine::SystemdBoot,
            (Firmware::Uefi, BootloaderChoice::Refind) => BootRoutine::Refind,
        }
    }
}

/// The `--target` platform given to `grub-install` on this architecture.
pub fn grub_target(firmware: Firmware, arch: &'static str) -> Result<&'static str, InstallError> {
    match (firmware, arch) {
        (Firmware::Bios, "x86_64") => Ok("i386-pc"),
        (Firmware::Uefi, "x86_64") => Ok("x86_64-efi"),
        (Firmware::Uefi, "aarch64") => Ok("arm64-efi"),
        (firmware, arch) => Err(InstallError::UnsupportedArch { arch, firmware }),
    }
}

pub fn loader_conf() -> &'static str { "default arch.conf\ntimeout 3\neditor 0\n" }

/// The systemd-boot entry which boots the root file system with the given UUID.
pub fn loader_entry(root_uuid: &str) -> String {
    format!(
        "title Arch Linux\nlinux /vmlinuz-linux\ninitrd /initramfs-linux.img\noptions root=UUID={} rw\n",
        root_uuid
    )
}

/// Installs and configures the bootloader of the target.
pub fn bootloader<E: Executor>(
    exec: &mut E,
    config: &InstallConfig,
    partitions: &Partitions,
) -> Result<(), InstallError> {
    let routine = BootRoutine::select(config.firmware, config.bootloader);
    let target = &config.system.target;
    let chroot = ArchChroot::new(target.as_path());
    info!("{}: installing bootloader with {:?}", config.disk.display(), routine);

    match routine {
        BootRoutine::GrubBios => {
            let grub_target = format!("--target={}", grub_target(Firmware::Bios, env::consts::ARCH)?);
            let disk = config.disk.to_string_lossy();
            ChrootConfigurator::new(exec, chroot.clone()).install(&["grub"])?;
            exec.run(&chroot.command("grub-install", &[grub_target.as_str(), &*disk]))?;
            grub_mkconfig(exec, &chroot)?;
        }
        BootRoutine::GrubEfi => {
            let grub_target = format!("--target={}", grub_target(Firmware::Uefi, env::consts::ARCH)?);
            ChrootConfigurator::new(exec, chroot.clone()).install(&["grub", "efibootmgr"])?;
            exec.run(&chroot.command("grub-install", &[
                grub_target.as_str(),
                "--efi-directory=/boot",
                "--bootloader-id=GRUB",
            ]))?;
            grub_mkconfig(exec, &chroot)?;
        }
        BootRoutine::SystemdBoot => {
            ChrootConfigurator::new(exec, chroot.clone()).install(&["efibootmgr"])?;
            exec.run(&chroot.command("bootctl", &["--esp-path=/boot", "install"]))?;

            let root = partitions.root();
            let uuid = root_uuid(exec, &root.path)?;
            info!("{}: root file system has UUID {}", root.path.display(), uuid);

            write_file(&chroot.join("boot/loader/loader.conf"), loader_conf())?;
            write_file(&chroot.join("boot/loader/entries/arch.conf"), &loader_entry(&uuid))?;
        }
        BootRoutine::Refind => {
            ChrootConfigurator::new(exec, chroot.clone()).install(&["refind"])?;
            exec.run(&chroot.command("refind-install", &[] as &[&str]))?;
        }
    }

    Ok(())
}

fn grub_mkconfig<E: Executor>(exec: &mut E, chroot: &ArchChroot) -> Result<(), InstallError> {
    exec.run(&chroot.command("grub-mkconfig", &["-o", "/boot/grub/grub.cfg"]))
        .map_err(InstallError::from)
}

fn root_uuid<E: Executor>(exec: &mut E, root: &Path) -> Result<String, InstallError> {
    let command = cascade! {
        Command::new("blkid");
        ..args(&["-s", "UUID", "-o", "value"]);
        ..arg(root.to_string_lossy());
    };

    Ok(exec.stdout(&command)?.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_choices_fall_back_to_grub() {
        for &choice in &BootloaderChoice::ALL {
            assert_eq!(BootRoutine::select(Firmware::Bios, choice), BootRoutine::GrubBios);
            assert_eq!(choice.supports(Firmware::Bios), choice == BootloaderChoice::Grub);
            assert!(choice.supports(Firmware::Uefi));
        }

        assert_eq!(BootRoutine::select(Firmware::Uefi, BootloaderChoice::Grub), BootRoutine::GrubEfi);
        assert_eq!(
            BootRoutine::select(Firmware::Uefi, BootloaderChoice::SystemdBoot),
            BootRoutine::SystemdBoot
        );
        assert_eq!(BootRoutine::select(Firmware::Uefi, BootloaderChoice::Refind), BootRoutine::Refind);
    }

    #[test]
    fn grub_targets() {
        assert_eq!(grub_target(Firmware::Bios, "x86_64").unwrap(), "i386-pc");
        assert_eq!(grub_target(Firmware::Uefi, "x86_64").unwrap(), "x86_64-efi");
        assert_eq!(grub_target(Firmware::Uefi, "aarch64").unwrap(), "arm64-efi");

        match grub_target(Firmware::Bios, "aarch64") {
            Err(InstallError::UnsupportedArch { arch, firmware }) => {
                assert_eq!(arch, "aarch64");
                assert_eq!(firmware, Firmware::Bios);
            }
            other => panic!("expected an unsupported architecture, got {:?}", other),
        }
    }

    #[test]
    fn loader_files() {
        assert_eq!(loader_conf().lines().next(), Some("default arch.conf"));
        assert!(loader_entry("1234-abcd").ends_with("options root=UUID=1234-abcd rw\n"));
    }
}
