use std::fmt;

const REDACTED: &str = "********";

/// An external command that has yet to be executed.
///
/// Unlike `std::process::Command`, this is a plain value which can be compared, recorded,
/// and displayed. Arguments added with `secret_arg` and any stdin payload are never
/// rendered by the `Display` or `Debug` implementations.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    program:     String,
    args:        Vec<String>,
    secrets:     Vec<usize>,
    stdin:       Option<String>,
    check:       bool,
    interactive: bool,
}

impl Command {
    pub fn new<S: AsRef<str>>(program: S) -> Self {
        Command {
            program:     program.as_ref().to_owned(),
            args:        Vec::new(),
            secrets:     Vec::new(),
            stdin:       None,
            check:       true,
            interactive: false,
        }
    }

    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<S: AsRef<str>, I: IntoIterator<Item = S>>(&mut self, args: I) -> &mut Self {
        self.args.extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Append an argument which must never appear in logs, such as a passphrase.
    pub fn secret_arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.secrets.push(self.args.len());
        self.arg(arg)
    }

    /// Feed the given input to the program's stdin.
    pub fn stdin_input<S: Into<String>>(mut self, input: S) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Do not treat a non-zero exit status as an error.
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    /// Attach the program to the operator's terminal instead of capturing its output.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn program(&self) -> &str { &self.program }

    pub fn get_args(&self) -> &[String] { &self.args }

    pub fn get_stdin(&self) -> Option<&str> { self.stdin.as_ref().map(String::as_str) }

    pub fn is_checked(&self) -> bool { self.check }

    pub fn is_interactive(&self) -> bool { self.interactive }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.program)?;
        for (id, arg) in self.args.iter().enumerate() {
            if self.secrets.contains(&id) {
                write!(f, " {}", REDACTED)?;
            } else if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Command")
            .field("command", &format_args!("{}", self))
            .field("stdin", &self.stdin.as_ref().map(|_| REDACTED))
            .field("check", &self.check)
            .field("interactive", &self.interactive)
            .finish()
    }
}

/// The captured result of an executed command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    /// Exit code of the process, or `None` if it was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool { self.status == Some(0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_whitespace() {
        let command = cascade! {
            Command::new("iwctl");
            ..args(&["station", "wlan0", "connect", "My Network"]);
        };

        assert_eq!(command.to_string(), "iwctl station wlan0 connect 'My Network'");
    }

    #[test]
    fn secrets_are_redacted() {
        let command = cascade! {
            Command::new("iwctl");
            ..args(&["station", "wlan0", "connect", "home"]);
            ..arg("--passphrase");
            ..secret_arg("hunter2");
        };

        let rendered = command.to_string();
        assert!(!rendered.contains("hunter2"), "{}", rendered);
        assert!(rendered.ends_with("--passphrase ********"), "{}", rendered);
        assert_eq!(command.get_args()[5], "hunter2");
    }

    #[test]
    fn stdin_is_never_rendered() {
        let command = Command::new("chpasswd").stdin_input("root:hunter2\n");
        assert!(!format!("{}", command).contains("hunter2"));
        assert!(!format!("{:?}", command).contains("hunter2"));
        assert_eq!(command.get_stdin(), Some("root:hunter2\n"));
    }

    #[test]
    fn commands_are_checked_by_default() {
        assert!(Command::new("true").is_checked());
        assert!(!Command::new("ping").unchecked().is_checked());
        assert!(Command::new("cfdisk").interactive().is_interactive());
    }
}
