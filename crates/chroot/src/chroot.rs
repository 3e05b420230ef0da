use crate::command::Command;
use std::path::{Path, PathBuf};

/// Defines the location of a mounted target, and builds commands that will be executed
/// within it through `arch-chroot`.
///
/// `arch-chroot` performs the `/dev`, `/proc`, `/sys`, and `/run` binding mounts itself,
/// and tears them down once the command exits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchChroot {
    pub path: PathBuf,
}

impl ArchChroot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { ArchChroot { path: path.into() } }

    /// Builds a command which executes `cmd` with `arch-chroot`.
    pub fn command<S: AsRef<str>, T: AsRef<str>, I: IntoIterator<Item = T>>(
        &self,
        cmd: S,
        args: I,
    ) -> Command {
        cascade! {
            Command::new("arch-chroot");
            ..arg(self.path.to_string_lossy());
            ..arg(cmd.as_ref());
            ..args(args);
        }
    }

    /// Resolves a path from within the chroot, such as `/etc/hostname`, to the host.
    pub fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        self.path.join(path.strip_prefix("/").unwrap_or(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_runs_within_target() {
        let chroot = ArchChroot::new("/mnt");
        let command = chroot.command("systemctl", &["enable", "NetworkManager"]);
        assert_eq!(command.program(), "arch-chroot");
        assert_eq!(command.to_string(), "arch-chroot /mnt systemctl enable NetworkManager");
    }

    #[test]
    fn join_strips_root() {
        let chroot = ArchChroot::new("/mnt");
        assert_eq!(chroot.join("/etc/hostname"), PathBuf::from("/mnt/etc/hostname"));
        assert_eq!(chroot.join("boot/loader"), PathBuf::from("/mnt/boot/loader"));
    }
}
