use crate::command::{Command, Output};
use failure::Fail;
use std::{
    io::{self, BufRead, BufReader, Write},
    process::{self, ExitStatus, Stdio},
    sync::mpsc,
    thread,
};

/// A command which could not be executed, or which exited unsuccessfully.
#[derive(Debug, Fail)]
pub enum CommandError {
    #[fail(display = "command {} was not found", command)]
    NotFound { command: String },
    #[fail(display = "failed to spawn process {}: {}", command, why)]
    Spawn { command: String, why: io::Error },
    #[fail(display = "failed to communicate with {}: {}", command, why)]
    Io { command: String, why: io::Error },
    #[fail(display = "{} failed with exit status {}: {}", command, status, stderr)]
    Failed { command: String, status: String, stderr: String },
}

impl CommandError {
    /// The rendered command line which caused this error.
    pub fn command(&self) -> &str {
        match self {
            CommandError::NotFound { command }
            | CommandError::Spawn { command, .. }
            | CommandError::Io { command, .. }
            | CommandError::Failed { command, .. } => command.as_str(),
        }
    }
}

/// Runs external commands on behalf of the installer.
pub trait Executor {
    /// Execute the command to completion, returning its captured output.
    ///
    /// If the command is checked, a non-zero exit status is returned as an error.
    fn execute(&mut self, command: &Command) -> Result<Output, CommandError>;

    /// Execute the command, discarding its output.
    fn run(&mut self, command: &Command) -> Result<(), CommandError> {
        self.execute(command).map(|_| ())
    }

    /// Execute the command, and return what it wrote to stdout.
    fn stdout(&mut self, command: &Command) -> Result<String, CommandError> {
        self.execute(command).map(|output| output.stdout)
    }
}

impl<'a, E: Executor + ?Sized> Executor for &'a mut E {
    fn execute(&mut self, command: &Command) -> Result<Output, CommandError> {
        (**self).execute(command)
    }
}

/// Executes commands as child processes of the running system.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&mut self, command: &Command) -> Result<Output, CommandError> {
        let cmd = command.to_string();
        info!("running {}", cmd);

        let mut child = process::Command::new(command.program());
        child.args(command.get_args());

        if command.is_interactive() {
            let status = child
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|why| spawn_error(&cmd, why))?;

            return status_as_result(command, status, Output::default());
        }

        child
            .stdin(if command.get_stdin().is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = child.spawn().map_err(|why| spawn_error(&cmd, why))?;

        // A child may exit before consuming its input. Its status and stderr are still
        // collected, and take precedence over the write error.
        let mut stdin_error = None;
        if let Some(input) = command.get_stdin() {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(why) = stdin.write_all(input.as_bytes()) {
                    warn!("unable to write to stdin of {}: {}", cmd, why);
                    stdin_error = Some(why);
                }
            }
        }

        enum Message {
            Stdout(String),
            Stderr(String),
        }

        let (tx, rx) = mpsc::channel();

        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            thread::spawn(move || {
                for line in BufReader::new(stdout).lines().filter_map(Result::ok) {
                    let _ = tx.send(Message::Stdout(line));
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().filter_map(Result::ok) {
                    let _ = tx.send(Message::Stderr(line));
                }
            });
        }

        let mut output = Output::default();
        for message in rx {
            match message {
                Message::Stdout(line) => {
                    info!("{}", line);
                    output.stdout.push_str(&line);
                    output.stdout.push('\n');
                }
                Message::Stderr(line) => {
                    warn!("{}", line);
                    output.stderr.push_str(&line);
                    output.stderr.push('\n');
                }
            }
        }

        let status = child.wait().map_err(|why| CommandError::Io { command: cmd.clone(), why })?;
        match (status_as_result(command, status, output), stdin_error) {
            (Ok(_), Some(why)) => Err(CommandError::Io { command: cmd, why }),
            (result, _) => result,
        }
    }
}

fn spawn_error(cmd: &str, why: io::Error) -> CommandError {
    if why.kind() == io::ErrorKind::NotFound {
        CommandError::NotFound { command: cmd.to_owned() }
    } else {
        CommandError::Spawn { command: cmd.to_owned(), why }
    }
}

fn status_as_result(
    command: &Command,
    status: ExitStatus,
    mut output: Output,
) -> Result<Output, CommandError> {
    output.status = status.code();

    if status.success() || !command.is_checked() {
        Ok(output)
    } else if let Some(127) = status.code() {
        Err(CommandError::NotFound { command: command.to_string() })
    } else {
        Err(CommandError::Failed {
            command: command.to_string(),
            status:  status.code().map_or_else(|| "unknown".into(), |code| code.to_string()),
            stderr:  output.stderr.trim_end().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_found() {
        match SystemExecutor.execute(&Command::new("asdfasdf")) {
            Err(CommandError::NotFound { command }) => assert_eq!(command, "asdfasdf"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn command_with_output() {
        let command = cascade! {
            Command::new("echo");
            ..arg("Hello, Command!");
        };

        assert_eq!(SystemExecutor.stdout(&command).unwrap(), "Hello, Command!\n");
    }

    #[test]
    fn command_with_stdin() {
        let command = Command::new("cat").stdin_input("from stdin\n");
        assert_eq!(SystemExecutor.stdout(&command).unwrap(), "from stdin\n");
    }

    #[test]
    fn failure_carries_stderr() {
        let command = cascade! {
            Command::new("sh");
            ..args(&["-c", "echo broken >&2; exit 3"]);
        };

        match SystemExecutor.execute(&command) {
            Err(CommandError::Failed { status, stderr, .. }) => {
                assert_eq!(status, "3");
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn early_exit_with_unread_stdin() {
        let input = "x".repeat(1024 * 1024);
        let command = cascade! {
            Command::new("sh");
            ..args(&["-c", "echo early >&2; exit 3"]);
        }
        .stdin_input(input);

        match SystemExecutor.execute(&command) {
            Err(CommandError::Failed { status, stderr, .. }) => {
                assert_eq!(status, "3");
                assert_eq!(stderr, "early");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn unchecked_failure_is_output() {
        let output = SystemExecutor.execute(&Command::new("false").unchecked()).unwrap();
        assert!(!output.success());
        assert_eq!(output.status, Some(1));
    }
}
