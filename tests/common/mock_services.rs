//! Test doubles for services that normally talk to the terminal

use reposync::infrastructure::terminal::Prompter;
use std::collections::VecDeque;
use std::io;

/// Prompter that answers from a fixed list and fails once it runs out
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    usernames: VecDeque<String>,
    passwords: VecDeque<String>,
}

impl ScriptedPrompter {
    /// A prompter that must never be asked
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_passwords(passwords: &[&str]) -> Self {
        Self {
            usernames: VecDeque::new(),
            passwords: passwords.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_username(&mut self, url: &str) -> io::Result<String> {
        self.usernames.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("unexpected username prompt for {}", url),
            )
        })
    }

    fn read_password(&mut self, url: &str, _username: &str) -> io::Result<String> {
        self.passwords.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("unexpected password prompt for {}", url),
            )
        })
    }
}
