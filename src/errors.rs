use crate::chroot::CommandError;
use crate::config::ValidationError;
use crate::disk::DiskError;
use crate::Firmware;
use failure::Fail;
use std::io;

/// Any error that may abort an installation.
#[derive(Debug, Fail)]
pub enum InstallError {
    #[fail(display = "{}", why)]
    Command { #[cause] why: CommandError },
    #[fail(display = "{}", why)]
    Disk { #[cause] why: DiskError },
    #[fail(display = "invalid configuration: {}", why)]
    Validation { #[cause] why: ValidationError },
    #[fail(display = "{}: {}", context, why)]
    Io { context: String, #[cause] why: io::Error },
    #[fail(display = "unsupported architecture {} for {} bootloader", arch, firmware)]
    UnsupportedArch { arch: &'static str, firmware: Firmware },
    #[fail(display = "installation was interrupted")]
    Interrupted,
}

impl From<CommandError> for InstallError {
    fn from(why: CommandError) -> Self { InstallError::Command { why } }
}

impl From<DiskError> for InstallError {
    fn from(why: DiskError) -> Self {
        match why {
            DiskError::Command { why } => InstallError::Command { why },
            why => InstallError::Disk { why },
        }
    }
}

impl From<ValidationError> for InstallError {
    fn from(why: ValidationError) -> Self { InstallError::Validation { why } }
}

pub trait IoContext<T> {
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, func: F) -> Result<T, InstallError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, func: F) -> Result<T, InstallError> {
        self.map_err(|why| InstallError::Io { context: func().into(), why })
    }
}
