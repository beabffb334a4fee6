//! Interactive and non-interactive credential input.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use lms_mirror::Credentials;

/// Environment variable consulted for the password before prompting.
pub(crate) const PASSWORD_ENV: &str = "LMS_MIRROR_PASSWORD";

/// Collects credentials from the resolved username, the environment and stdin.
///
/// The username is prompted for only when stdin is a terminal. The password
/// comes from [`PASSWORD_ENV`], else the first line of piped stdin, else a
/// masked terminal prompt.
pub(crate) fn read_credentials(username: Option<String>) -> Result<Credentials> {
    let env_password = std::env::var(PASSWORD_ENV).ok();
    collect_credentials(
        username,
        io::stdin().is_terminal(),
        env_password,
        CredentialPrompts {
            username: || prompt_line("Username: "),
            password: || {
                rpassword::prompt_password("Password: ").context("Failed to read password")
            },
            piped_password: || {
                read_first_line(io::stdin().lock()).context("Failed to read password from stdin")
            },
        },
    )
}

/// Sources consulted when a value is not already known.
struct CredentialPrompts<U, P, S> {
    username: U,
    /// Reads the password from the terminal without echo.
    password: P,
    piped_password: S,
}

fn collect_credentials<U, P, S>(
    username: Option<String>,
    stdin_is_terminal: bool,
    env_password: Option<String>,
    prompts: CredentialPrompts<U, P, S>,
) -> Result<Credentials>
where
    U: FnOnce() -> Result<String>,
    P: FnOnce() -> Result<String>,
    S: FnOnce() -> Result<String>,
{
    let username = match username {
        Some(name) => name,
        None if stdin_is_terminal => (prompts.username)()?,
        None => bail!("No username given; pass --username or set LMS_MIRROR_USERNAME"),
    };
    if username.is_empty() {
        bail!("Username must not be empty");
    }

    let password = match env_password.filter(|p| !p.is_empty()) {
        Some(password) => password,
        None if stdin_is_terminal => (prompts.password)()?,
        None => (prompts.piped_password)()?,
    };

    Ok(Credentials::new(username, password))
}

fn prompt_line(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;
    read_first_line(io::stdin().lock())
}

fn read_first_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
