mod state;

pub(crate) mod steps;


pub use self::steps::{BootRoutine, BootloaderChoice, Step};

use self::state::InstallerState;

use crate::chroot::Executor;
use crate::config::InstallConfig;
use crate::disk::Parted;
use crate::errors::InstallError;
use failure::Fail;

macro_rules! percent {
    ($steps:expr) => {
        |percent| {
            $steps.status.percent = percent;
            let status = $steps.status;
            $steps.emit_status(status);
        }
    };
}

/// Installer error
#[derive(Debug, Fail)]
#[fail(display = "{} step failed: {}", step, err)]
pub struct Error {
    pub step: Step,
    #[cause]
    pub err:  InstallError,
}

/// Installer status
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub step:    Step,
    pub percent: i32,
}

/// An installer object
pub struct Installer {
    error_cb:  Option<Box<dyn FnMut(&Error)>>,
    status_cb: Option<Box<dyn FnMut(&Status)>>,
    parted:    Parted,
}

impl Default for Installer {
    /// Create a new installer object
    ///
    /// ```ignore,rust
    /// use archinst::Installer;
    /// let installer = Installer::default();
    /// ```
    fn default() -> Self { Self { error_cb: None, status_cb: None, parted: Parted::default() } }
}

impl Installer {
    /// An installer which reads disk geometry through the given partitioner.
    pub fn new(parted: Parted) -> Self { Self { parted, ..Self::default() } }

    /// Installs Arch Linux according to the configuration, running every external
    /// command through `exec`.
    ///
    /// The configuration is validated before the disk is touched. Each step runs to
    /// completion before the next begins, and nothing is rolled back on failure.
    pub fn install<E: Executor>(
        &mut self,
        exec: &mut E,
        config: &InstallConfig,
    ) -> Result<(), InstallError> {
        debug!("installing with {:#?}", config);
        config.validate()?;

        let parted = self.parted.clone();
        let target = config.system.target.as_path();
        let steps = &mut InstallerState::new(self);

        let partitions = steps.apply(Step::Partition, "partitioning", |steps| {
            steps::partition(exec, &parted, config, percent!(steps))
        })?;

        steps.apply(Step::Format, "formatting", |steps| {
            steps::format(exec, &partitions, percent!(steps))
        })?;

        steps.apply(Step::Mount, "mounting", |steps| {
            steps::mount(exec, &partitions, target, percent!(steps))
        })?;

        steps.apply(Step::Bootstrap, "bootstrapping", |steps| {
            steps::bootstrap(exec, config, percent!(steps))
        })?;

        steps.apply(Step::Desktop, "installing desktop", |steps| {
            steps::desktop(exec, config, percent!(steps))
        })?;

        steps.apply(Step::Configure, "configuring", |steps| {
            steps::configure(exec, config, &partitions, percent!(steps))
        })?;

        steps.apply(Step::Unmount, "unmounting", |steps| {
            steps::unmount(exec, target, percent!(steps))
        })?;

        info!("installation of {} complete", config.hostname);
        Ok(())
    }

    /// Send an error message
    pub fn emit_error(&mut self, error: &Error) {
        if let Some(ref mut cb) = self.error_cb {
            cb(error);
        }
    }

    /// Set the error callback
    ///
    /// ```ignore,rust
    /// use archinst::Installer;
    /// let mut installer = Installer::default();
    /// installer.on_error(|error| eprintln!("{}", error));
    /// ```
    pub fn on_error<F: FnMut(&Error) + 'static>(&mut self, callback: F) {
        self.error_cb = Some(Box::new(callback));
    }

    /// Send a status message
    pub fn emit_status(&mut self, status: Status) {
        if let Some(ref mut cb) = self.status_cb {
            cb(&status);
        }
    }

    /// Set the status callback
    ///
    /// ```ignore,rust
    /// use archinst::Installer;
    /// let mut installer = Installer::default();
    /// installer.on_status(|status| println!("{:?}", status));
    /// ```
    pub fn on_status<F: FnMut(&Status) + 'static>(&mut self, callback: F) {
        self.status_cb = Some(Box::new(callback));
    }
}
