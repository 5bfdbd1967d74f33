use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Last `n` lines of a log file. Bot logs stay small enough (the bot rotates
/// them itself) that reading the whole file is fine here.
pub fn tail(path: &Path, n: usize) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|s| s.to_string()).collect())
}

/// Size and mtime of the log file, `None` when it does not exist yet.
pub fn stat(path: &Path) -> Option<(u64, DateTime<Utc>)> {
    let meta = fs::metadata(path).ok()?;
    let modified: DateTime<Utc> = meta.modified().ok()?.into();
    Some((meta.len(), modified))
}
