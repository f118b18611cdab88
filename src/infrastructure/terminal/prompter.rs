use console::Term;
use std::io;

/// Source of interactively entered credentials.
///
/// `url` is always the redacted form of the remote URL.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Ask for a username. Input is echoed.
    fn read_username(&mut self, url: &str) -> io::Result<String>;

    /// Ask for a password. Input is not echoed.
    fn read_password(&mut self, url: &str, username: &str) -> io::Result<String>;
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn read_username(&mut self, url: &str) -> io::Result<String> {
        (**self).read_username(url)
    }

    fn read_password(&mut self, url: &str, username: &str) -> io::Result<String> {
        (**self).read_password(url, username)
    }
}

/// Prompter that writes to stderr and reads from the controlling terminal
#[derive(Debug, Clone)]
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ensure_interactive(&self) -> io::Result<()> {
        if self.term.is_term() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "credentials required but no terminal is attached",
            ))
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn read_username(&mut self, url: &str) -> io::Result<String> {
        self.ensure_interactive()?;
        self.term.write_str(&format!("Username for '{}': ", url))?;
        let line = self.term.read_line()?;
        Ok(line.trim().to_string())
    }

    fn read_password(&mut self, url: &str, username: &str) -> io::Result<String> {
        self.ensure_interactive()?;
        self.term
            .write_str(&format!("Password for '{}' ({}): ", url, username))?;
        self.term.read_secure_line()
    }
}
