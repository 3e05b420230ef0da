//! Test doubles shared by the unit tests of the library.

use crate::chroot::{Command, CommandError, Executor, Output};
use std::{fs, path::Path};

/// An executor which records every command instead of running it.
///
/// Commands whose rendering contains a scripted needle receive the scripted stdout, and
/// commands matching a failure needle exit with status 1.
#[derive(Debug, Default)]
pub struct Recorder {
    pub executed: Vec<Command>,
    responses:    Vec<(String, String)>,
    failures:     Vec<String>,
}

impl Recorder {
    /// Reply with `stdout` to any command containing `needle`.
    pub fn respond(mut self, needle: &str, stdout: &str) -> Self {
        self.responses.push((needle.into(), stdout.into()));
        self
    }

    /// Fail any command containing `needle`.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.failures.push(needle.into());
        self
    }

    /// The rendered command lines, in the order they were executed.
    pub fn commands(&self) -> Vec<String> {
        self.executed.iter().map(ToString::to_string).collect()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.commands().iter().position(|command| command.contains(needle))
    }
}

impl Executor for Recorder {
    fn execute(&mut self, command: &Command) -> Result<Output, CommandError> {
        let rendered = command.to_string();
        self.executed.push(command.clone());

        if self.failures.iter().any(|needle| rendered.contains(needle.as_str())) {
            if !command.is_checked() {
                return Ok(Output { status: Some(1), ..Output::default() });
            }

            return Err(CommandError::Failed {
                command: rendered,
                status:  "1".into(),
                stderr:  "scripted failure".into(),
            });
        }

        let stdout = self
            .responses
            .iter()
            .find(|(needle, _)| rendered.contains(needle.as_str()))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default();

        Ok(Output { status: Some(0), stdout, stderr: String::new() })
    }
}

/// Creates the sysfs entries of a disk under `root/sys/block/<name>`.
pub fn fake_disk(root: &Path, name: &str, sectors_512: u64, logical_block_size: u64) {
    let block = root.join("sys/block").join(name);
    fs::create_dir_all(block.join("queue")).unwrap();
    fs::write(block.join("size"), format!("{}\n", sectors_512)).unwrap();
    fs::write(block.join("queue/logical_block_size"), format!("{}\n", logical_block_size)).unwrap();
    fs::write(block.join("queue/optimal_io_size"), "0\n").unwrap();
}
