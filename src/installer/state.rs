use super::{Error, Installer, Status, Step};
use crate::errors::InstallError;
use crate::KILL_SWITCH;
use std::sync::atomic::Ordering;

pub struct InstallerState<'a> {
    pub installer: &'a mut Installer,
    pub status:    Status,
}

impl<'a> InstallerState<'a> {
    pub fn new(installer: &'a mut Installer) -> Self {
        Self { installer, status: Status { step: Step::Partition, percent: 0 } }
    }

    /// Runs a step of the installation, reporting its progress and any error it returns.
    ///
    /// Disks are synced before each step, and no further steps are started once the
    /// kill switch has been set.
    pub fn apply<T, F>(&mut self, step: Step, msg: &str, mut action: F) -> Result<T, InstallError>
    where
        F: for<'c> FnMut(&'c mut Self) -> Result<T, InstallError>,
    {
        unsafe {
            libc::sync();
        }

        if KILL_SWITCH.load(Ordering::SeqCst) {
            warn!("interrupted before the {} step", step);
            return Err(InstallError::Interrupted);
        }

        self.status.step = step;
        self.status.percent = 0;
        let status = self.status;
        self.emit_status(status);

        info!("starting {} step", msg);
        match action(self) {
            Ok(value) => {
                self.status.percent = 100;
                let status = self.status;
                self.emit_status(status);
                Ok(value)
            }
            Err(err) => {
                error!("{} error: {}", msg, err);
                let error = Error { step: self.status.step, err };
                self.emit_error(&error);
                Err(error.err)
            }
        }
    }

    pub fn emit_status(&mut self, status: Status) { self.installer.emit_status(status); }

    pub fn emit_error(&mut self, error: &Error) { self.installer.emit_error(error); }
}
