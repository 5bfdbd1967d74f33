//! Document model for the bot's flat `KEY=VALUE` configuration file.
//!
//! The `.env` is user data after the installer writes it once: edits must
//! touch only the addressed line so comments, ordering and untouched pairs
//! survive a load/edit/save round trip. Values are written verbatim (no
//! shell quoting) because the consumer is python-dotenv, not a shell.

use crate::domain::errors::EnvFileError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Blank line or `#` comment, kept byte for byte.
    Raw(String),
    Pair { key: String, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    lines: Vec<Line>,
}

fn valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl EnvFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, EnvFileError> {
        let mut lines = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                lines.push(Line::Raw(raw.to_string()));
                continue;
            }

            let (key, value) = raw.split_once('=').ok_or(EnvFileError::MalformedLine {
                line: idx + 1,
                content: raw.to_string(),
            })?;

            let key = key.trim().to_string();
            if !valid_key(&key) {
                return Err(EnvFileError::InvalidKey { key });
            }

            lines.push(Line::Pair {
                key,
                value: value.to_string(),
            });
        }

        Ok(Self { lines })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Updates the key in place, or appends it when absent.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), EnvFileError> {
        if !valid_key(key) {
            return Err(EnvFileError::InvalidKey {
                key: key.to_string(),
            });
        }

        for line in self.lines.iter_mut() {
            if let Line::Pair { key: k, value: v } = line {
                if k == key {
                    *v = value.to_string();
                    return Ok(());
                }
            }
        }

        self.lines.push(Line::Pair {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Removes all pairs with this key. Returns true when anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(line, Line::Pair { key: k, .. } if k == key));
        self.lines.len() != before
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn comment(&mut self, text: &str) {
        self.lines.push(Line::Raw(format!("# {}", text)));
    }

    pub fn blank(&mut self) {
        self.lines.push(Line::Raw(String::new()));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Raw(raw) => out.push_str(raw),
                Line::Pair { key, value } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
            }
            out.push('\n');
        }
        out
    }
}
