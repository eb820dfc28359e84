//! Username/password table backing both servers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("cannot read users file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed users file entry at line {line}")]
    Malformed { line: usize },
}

/// Read-only user directory, loaded once at startup and shared across
/// connections behind an `Arc`.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, String>,
}

impl UserDirectory {
    /// Loads a users file: one `username password` pair per line,
    /// whitespace-separated. Blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let text = fs::read_to_string(path)?;
        let mut users = HashMap::new();

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(name), Some(password)) = (fields.next(), fields.next()) else {
                return Err(DirectoryError::Malformed { line: i + 1 });
            };
            users.insert(name.to_owned(), password.to_owned());
        }

        Ok(Self { users })
    }

    /// Builds a directory directly from pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let users = pairs
            .iter()
            .map(|(name, password)| ((*name).to_owned(), (*password).to_owned()))
            .collect();
        Self { users }
    }

    /// Known-user check: the USER and RCPT lookup.
    pub fn contains(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    /// Full credential check: the PASS lookup.
    pub fn verify(&self, name: &str, password: &str) -> bool {
        self.users.get(name).is_some_and(|p| p == password)
    }
}
