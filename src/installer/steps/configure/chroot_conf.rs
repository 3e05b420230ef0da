use super::super::{append_file, write_file};
use crate::chroot::{ArchChroot, Executor};
use crate::config::Password;
use crate::errors::{InstallError, IoContext};
use std::fs;

const WHEEL_COMMENTED: &str = "# %wheel ALL=(ALL:ALL) ALL";
const WHEEL_ENABLED: &str = "%wheel ALL=(ALL:ALL) ALL";

/// Applies configuration to the mounted target, through `arch-chroot` and by writing its
/// files directly.
pub struct ChrootConfigurator<'a, E: Executor> {
    exec:   &'a mut E,
    chroot: ArchChroot,
}

impl<'a, E: Executor> ChrootConfigurator<'a, E> {
    pub fn new(exec: &'a mut E, chroot: ArchChroot) -> Self { Self { exec, chroot } }

    fn run<S: AsRef<str>>(&mut self, cmd: &str, args: &[S]) -> Result<(), InstallError> {
        let command = self.chroot.command(cmd, args);
        self.exec.run(&command).map_err(InstallError::from)
    }

    /// Install packages from the repositories, without confirmation.
    pub fn install(&mut self, packages: &[&str]) -> Result<(), InstallError> {
        info!("installing packages: {:?}", packages);
        self.run("pacman", &cascade! {
            Vec::with_capacity(packages.len() + 2);
            ..extend_from_slice(&["-S", "--noconfirm"]);
            ..extend_from_slice(packages);
        })
    }

    pub fn enable_service(&mut self, unit: &str) -> Result<(), InstallError> {
        info!("enabling {}", unit);
        self.run("systemctl", &["enable", unit])
    }

    pub fn hostname(&mut self, hostname: &str) -> Result<(), InstallError> {
        info!("setting hostname to {}", hostname);
        write_file(&self.chroot.join("etc/hostname"), &[hostname, "\n"].concat())
    }

    pub fn hosts(&mut self, hostname: &str) -> Result<(), InstallError> {
        info!("adding {} to /etc/hosts", hostname);
        append_file(
            &self.chroot.join("etc/hosts"),
            &format!(
                "127.0.0.1 localhost\n::1       localhost\n127.0.1.1 {0}.localdomain {0}\n",
                hostname
            ),
        )
    }

    pub fn timezone(&mut self, zone: &str) -> Result<(), InstallError> {
        info!("setting timezone to {}", zone);
        let zoneinfo = ["/usr/share/zoneinfo/", zone].concat();
        self.run("ln", &["-sf", zoneinfo.as_str(), "/etc/localtime"])?;
        self.run("hwclock", &["--systohc"])
    }

    /// Enables and generates the locale, and sets it as the system language.
    pub fn locale(&mut self, locale: &str) -> Result<(), InstallError> {
        info!("generating locale {}", locale);
        append_file(&self.chroot.join("etc/locale.gen"), &locale_gen_entry(locale))?;
        self.run::<&str>("locale-gen", &[])?;
        write_file(&self.chroot.join("etc/locale.conf"), &format!("LANG={}\n", locale))
    }

    /// Assigns a password to an account. The password is passed over stdin.
    pub fn set_password(&mut self, user: &str, password: &Password) -> Result<(), InstallError> {
        info!("setting the password of {}", user);
        let command = self
            .chroot
            .command("chpasswd", &[] as &[&str])
            .stdin_input(format!("{}:{}\n", user, password.expose()));
        self.exec.run(&command).map_err(InstallError::from)
    }

    /// Creates a user account in the `wheel` group, with a home directory.
    pub fn create_user(&mut self, user: &str, password: &Password) -> Result<(), InstallError> {
        info!("creating user account {}", user);
        self.run("useradd", &["-m", "-G", "wheel", user])?;
        self.set_password(user, password)
    }

    /// Grants members of `wheel` the right to run any command through sudo.
    pub fn wheel_sudo(&mut self) -> Result<(), InstallError> {
        let sudoers = self.chroot.join("etc/sudoers");
        if !sudoers.exists() {
            self.install(&["sudo"])?;
        }

        info!("allowing members of wheel to use sudo");
        let contents = fs::read_to_string(&sudoers)
            .with_context(|| format!("unable to read {}", sudoers.display()))?;

        write_file(&sudoers, &enable_wheel(&contents))
    }
}

/// The `/etc/locale.gen` line which enables a locale, such as `en_US.UTF-8 UTF-8`.
fn locale_gen_entry(locale: &str) -> String {
    let charset = locale.split('.').nth(1).unwrap_or("UTF-8");
    format!("{} {}\n", locale, charset)
}

fn enable_wheel(sudoers: &str) -> String {
    let mut output = String::with_capacity(sudoers.len());
    for line in sudoers.lines() {
        output.push_str(if line.trim() == WHEEL_COMMENTED { WHEEL_ENABLED } else { line });
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use tempdir::TempDir;

    #[test]
    fn locale_entries() {
        assert_eq!(locale_gen_entry("en_US.UTF-8"), "en_US.UTF-8 UTF-8\n");
        assert_eq!(locale_gen_entry("de_DE.ISO-8859-1"), "de_DE.ISO-8859-1 ISO-8859-1\n");
        assert_eq!(locale_gen_entry("C"), "C UTF-8\n");
    }

    #[test]
    fn wheel_is_uncommented() {
        let sudoers = "root ALL=(ALL:ALL) ALL\n## Uncomment to allow wheel\n# %wheel ALL=(ALL:ALL) ALL\n# %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n";
        assert_eq!(
            enable_wheel(sudoers),
            "root ALL=(ALL:ALL) ALL\n## Uncomment to allow wheel\n%wheel ALL=(ALL:ALL) ALL\n# %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n"
        );
    }

    #[test]
    fn passwords_travel_over_stdin() {
        let target = TempDir::new("archinst-target").unwrap();
        let mut exec = Recorder::default();
        ChrootConfigurator::new(&mut exec, ArchChroot::new(target.path()))
            .create_user("alice", &Password::new("s3cret pass"))
            .unwrap();

        let rendered = exec.commands();
        assert!(rendered.iter().all(|command| !command.contains("s3cret")), "{:?}", rendered);
        assert!(rendered[0].ends_with("useradd -m -G wheel alice"));
        assert!(rendered[1].ends_with("chpasswd"));
        assert_eq!(exec.executed[1].get_stdin(), Some("alice:s3cret pass\n"));
    }

    #[test]
    fn hosts_are_appended() {
        let target = TempDir::new("archinst-target").unwrap();
        let hosts = target.path().join("etc/hosts");
        fs::create_dir_all(hosts.parent().unwrap()).unwrap();
        fs::write(&hosts, "# Static table lookup for hostnames.\n").unwrap();

        let mut exec = Recorder::default();
        let mut conf = ChrootConfigurator::new(&mut exec, ArchChroot::new(target.path()));
        conf.hostname("box").unwrap();
        conf.hosts("box").unwrap();

        assert_eq!(fs::read_to_string(target.path().join("etc/hostname")).unwrap(), "box\n");
        assert_eq!(
            fs::read_to_string(&hosts).unwrap(),
            "# Static table lookup for hostnames.\n127.0.0.1 localhost\n::1       localhost\n127.0.1.1 box.localdomain box\n"
        );
    }

    #[test]
    fn sudo_is_installed_when_missing() {
        let target = TempDir::new("archinst-target").unwrap();
        let mut exec = Recorder::default();
        let result = ChrootConfigurator::new(&mut exec, ArchChroot::new(target.path())).wheel_sudo();

        // The recorder does not install anything, so the file is still missing afterwards.
        assert!(result.is_err());
        assert!(exec.commands()[0].ends_with("pacman -S --noconfirm sudo"));
    }
}
