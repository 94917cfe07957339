use std::env;
use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::domain::Credentials;
use crate::error::EnteroError;

pub const USERNAME_ENV: &str = "ENTEROBASE_USERNAME";
pub const PASSWORD_ENV: &str = "ENTEROBASE_PASSWORD";

pub trait CredentialSource {
    fn credentials(&self) -> Result<Credentials, EnteroError>;
}

/// Reads the login pair from `ENTEROBASE_USERNAME` / `ENTEROBASE_PASSWORD`,
/// prompting on the terminal for whichever is unset.
pub struct TerminalCredentials;

impl CredentialSource for TerminalCredentials {
    fn credentials(&self) -> Result<Credentials, EnteroError> {
        let username = match non_empty(env::var(USERNAME_ENV).ok()) {
            Some(value) => value,
            None => prompt_line("Please enter Enterobase username: ")
                .map_err(|err| EnteroError::Credentials(err.to_string()))?,
        };
        let password = match non_empty(env::var(PASSWORD_ENV).ok()) {
            Some(value) => value,
            None => prompt_hidden("Please enter Enterobase password: ")
                .map_err(|err| EnteroError::Credentials(err.to_string()))?,
        };
        build_credentials(username, password)
    }
}

pub fn build_credentials(username: String, password: String) -> Result<Credentials, EnteroError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(EnteroError::Credentials("username is empty".to_string()));
    }
    if password.is_empty() {
        return Err(EnteroError::Credentials("password is empty".to_string()));
    }
    Ok(Credentials::new(username, password))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_hidden(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;
    enable_raw_mode()?;
    let result = read_hidden();
    disable_raw_mode()?;
    stderr.write_all(b"\n")?;
    result
}

fn read_hidden() -> io::Result<String> {
    let mut value = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(value),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "password entry cancelled",
                ));
            }
            KeyCode::Char(ch) => value.push(ch),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn credentials_are_trimmed_and_required() {
        let credentials = build_credentials(" alice \n".to_string(), "pw".to_string()).unwrap();
        assert_eq!(credentials.username(), "alice");
        assert_eq!(credentials.password(), "pw");

        let err = build_credentials("".to_string(), "pw".to_string()).unwrap_err();
        assert_matches!(err, EnteroError::Credentials(_));
        let err = build_credentials("alice".to_string(), String::new()).unwrap_err();
        assert_matches!(err, EnteroError::Credentials(_));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("bob".to_string())), Some("bob".to_string()));
    }
}
