//! Plain line-based prompts on the operator's terminal.

use crate::errors::ArchinstError;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
    tty::IsTty,
};
use std::{
    fmt,
    io::{self, BufRead, Write},
};

/// Reads one line of input, without its trailing newline. End of input aborts the
/// installation.
fn read_line(prompt: &str) -> Result<String, ArchinstError> {
    print!("{}", prompt);
    io::stdout().flush().map_err(|why| ArchinstError::Input { why })?;

    let mut input = String::new();
    let stdin = io::stdin();
    match stdin.lock().read_line(&mut input) {
        Ok(0) => Err(ArchinstError::UserAbort),
        Ok(_) => {
            let len = input.trim_end_matches(|c| c == '\n' || c == '\r').len();
            input.truncate(len);
            Ok(input)
        }
        Err(ref why) if why.kind() == io::ErrorKind::Interrupted => Err(ArchinstError::UserAbort),
        Err(why) => Err(ArchinstError::Input { why }),
    }
}

/// Prompts for a value, with surrounding whitespace removed.
pub fn line(prompt: &str) -> Result<String, ArchinstError> {
    read_line(prompt).map(|input| input.trim().to_owned())
}

/// Prompts for a value, using `default` if nothing was entered.
pub fn line_or(prompt: &str, default: &str) -> Result<String, ArchinstError> {
    line(prompt).map(|input| if input.is_empty() { default.to_owned() } else { input })
}

/// Prompts for a secret, without echoing it to the terminal.
///
/// Input which is not a terminal is read as a plain line.
pub fn password(prompt: &str) -> Result<String, ArchinstError> {
    if !io::stdin().is_tty() {
        return read_line(prompt);
    }

    print!("{}", prompt);
    io::stdout().flush().map_err(|why| ArchinstError::Input { why })?;

    let result = {
        let _raw = RawMode::enable().map_err(|why| ArchinstError::Input { why })?;
        read_secret()
    };

    println!();
    result
}

/// Collects key presses until enter is pressed. Raw mode delivers Ctrl+C as a key
/// rather than a signal, so the terminal is restored before aborting.
fn read_secret() -> Result<String, ArchinstError> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = event::read().map_err(|why| ArchinstError::Input { why })? {
            match push_key(&mut secret, key) {
                SecretInput::Pending => (),
                SecretInput::Done => return Ok(secret),
                SecretInput::Aborted => return Err(ArchinstError::UserAbort),
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum SecretInput {
    Pending,
    Done,
    Aborted,
}

fn push_key(secret: &mut String, key: KeyEvent) -> SecretInput {
    if key.kind != KeyEventKind::Press {
        return SecretInput::Pending;
    }

    match key.code {
        KeyCode::Enter => SecretInput::Done,
        KeyCode::Char('c') | KeyCode::Char('d')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            SecretInput::Aborted
        }
        KeyCode::Esc => SecretInput::Aborted,
        KeyCode::Backspace => {
            secret.pop();
            SecretInput::Pending
        }
        KeyCode::Char(c) => {
            secret.push(c);
            SecretInput::Pending
        }
        _ => SecretInput::Pending,
    }
}

/// Keeps the terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> { terminal::enable_raw_mode().map(|_| RawMode) }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(why) = terminal::disable_raw_mode() {
            warn!("unable to restore the terminal: {}", why);
        }
    }
}

/// Lists the options, and prompts for one of them by number.
///
/// An empty or invalid selection falls back to the default option.
pub fn choice<T: Copy + fmt::Display>(
    title: &str,
    options: &[T],
    default: usize,
) -> Result<T, ArchinstError> {
    println!("{}", title);
    for (id, option) in options.iter().enumerate() {
        println!("[{}] {}", id + 1, option);
    }

    let input = line(&format!("Select an option [1-{}]: ", options.len()))?;
    let selected = parse_choice(&input, options.len()).unwrap_or_else(|| {
        if !input.is_empty() {
            println!("Invalid choice. Defaulting to option {}.", default + 1);
        }
        default
    });

    Ok(options[selected])
}

/// Converts a one-based selection into an index of a list with `len` options.
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|&n| n >= 1 && n <= len).map(|n| n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice(" 3 ", 3), Some(2));
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice("gnome", 3), None);
    }

    fn type_keys(keys: &[KeyEvent]) -> (String, SecretInput) {
        let mut secret = String::new();
        let mut state = SecretInput::Pending;
        for &key in keys {
            state = push_key(&mut secret, key);
            if state != SecretInput::Pending {
                break;
            }
        }

        (secret, state)
    }

    fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

    #[test]
    fn secret_keys() {
        let (secret, state) = type_keys(&[
            key(KeyCode::Char('h')),
            key(KeyCode::Char('x')),
            key(KeyCode::Backspace),
            key(KeyCode::Char('i')),
            key(KeyCode::Left),
            key(KeyCode::Enter),
            key(KeyCode::Char('z')),
        ]);

        assert_eq!(state, SecretInput::Done);
        assert_eq!(secret, "hi");
    }

    #[test]
    fn interrupted_secret() {
        let (_, state) = type_keys(&[
            key(KeyCode::Char('a')),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ]);

        assert_eq!(state, SecretInput::Aborted);
        assert_eq!(type_keys(&[key(KeyCode::Esc)]).1, SecretInput::Aborted);
    }
}
