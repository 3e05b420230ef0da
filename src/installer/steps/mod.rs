mod bootloader;
mod bootstrap;
mod configure;
mod desktop;
mod format;
mod mount;
mod partition;

pub use self::{
    bootloader::*, bootstrap::*, configure::*, desktop::*, format::*, mount::*, partition::*,
};

use crate::errors::{IoContext, InstallError};
use std::{
    fmt, fs,
    io::Write,
    path::Path,
};

/// Installation step
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Partition,
    Format,
    Mount,
    Bootstrap,
    Desktop,
    Configure,
    Unmount,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Step::Partition => "partition",
            Step::Format => "format",
            Step::Mount => "mount",
            Step::Bootstrap => "bootstrap",
            Step::Desktop => "desktop",
            Step::Configure => "configure",
            Step::Unmount => "unmount",
        })
    }
}

/// Replaces the contents of a file, creating its parent directories as needed.
fn write_file(path: &Path, contents: &str) -> Result<(), InstallError> {
    create_parent(path)?;
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))
}

/// Appends to a file, creating it and its parent directories as needed.
fn append_file(path: &Path, contents: &str) -> Result<(), InstallError> {
    create_parent(path)?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents.as_bytes()))
        .with_context(|| format!("unable to append to {}", path.display()))
}

fn create_parent(path: &Path) -> Result<(), InstallError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent)
            .with_context(|| format!("unable to create directory {}", parent.display())),
        None => Ok(()),
    }
}
