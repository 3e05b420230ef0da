use archinst::{chroot::CommandError, DiskError, ValidationError};
use failure::Fail;
use std::io;

#[derive(Debug, Fail)]
pub enum ArchinstError {
    #[fail(display = "installation aborted by user")]
    UserAbort,
    #[fail(display = "invalid disk selected: {}", why)]
    InvalidDisk { why: ValidationError },
    #[fail(display = "network configuration was skipped, and the installer requires internet access")]
    NetworkSkipped,
    #[fail(display = "still offline after configuring the network")]
    NetworkUnavailable,
    #[fail(display = "unable to read input: {}", why)]
    Input { why: io::Error },
    #[fail(display = "{}", why)]
    Command { why: CommandError },
    #[fail(display = "disk error: {}", why)]
    Disk { why: DiskError },
    #[fail(display = "{}", why)]
    Validation { why: ValidationError },
}

impl From<CommandError> for ArchinstError {
    fn from(why: CommandError) -> Self { ArchinstError::Command { why } }
}

impl From<DiskError> for ArchinstError {
    fn from(why: DiskError) -> Self { ArchinstError::Disk { why } }
}

impl From<ValidationError> for ArchinstError {
    fn from(why: ValidationError) -> Self { ArchinstError::Validation { why } }
}
