//! Detect whether a Linux system was booted in UEFI or legacy BIOS mode.
//!
//! ```rust,no_run
//! use archinst_firmware::Firmware;
//!
//! match Firmware::detect() {
//!     Firmware::Uefi => println!("System is in UEFI mode"),
//!     Firmware::Bios => println!("System is in BIOS mode")
//! }
//! ```

use std::{fmt, path::Path};

/// Firmware interface the live system was booted with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Firmware {
    Bios,
    Uefi,
}

impl Firmware {
    /// Detects whether the system is running from UEFI.
    pub fn detect() -> Firmware { Firmware::detect_in("/") }

    /// Performs the detection against an alternate root directory.
    pub fn detect_in<P: AsRef<Path>>(root: P) -> Firmware {
        if root.as_ref().join("sys/firmware/efi").is_dir() {
            Firmware::Uefi
        } else {
            Firmware::Bios
        }
    }

    pub fn is_uefi(self) -> bool { self == Firmware::Uefi }
}

impl fmt::Display for Firmware {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Firmware::Bios => "BIOS",
            Firmware::Uefi => "UEFI",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn efi_directory_means_uefi() {
        let root = TempDir::new("firmware").unwrap();
        assert_eq!(Firmware::detect_in(root.path()), Firmware::Bios);

        fs::create_dir_all(root.path().join("sys/firmware/efi")).unwrap();
        assert_eq!(Firmware::detect_in(root.path()), Firmware::Uefi);
        assert!(Firmware::detect_in(root.path()).is_uefi());
    }

    #[test]
    fn display() {
        assert_eq!(Firmware::Uefi.to_string(), "UEFI");
        assert_eq!(Firmware::Bios.to_string(), "BIOS");
    }
}
