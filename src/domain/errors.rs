use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while installing or updating the bot tree
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Python interpreter not found: {bin}")]
    PythonMissing { bin: String },

    #[error("Python {found} is too old, need at least {required}")]
    PythonTooOld { found: String, required: String },

    #[error("Required tool not found on PATH: {tool}")]
    ToolMissing { tool: String },

    #[error("Repository clone failed: {reason}")]
    CloneFailed { reason: String },

    #[error("Virtualenv creation failed at {path}: {reason}")]
    VenvFailed { path: PathBuf, reason: String },

    #[error("Bot is not installed at {dir} (run 'flowaictl install' first)")]
    NotInstalled { dir: PathBuf },
}

/// Errors related to process lifecycle control
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Bot already running with PID {pid}")]
    AlreadyRunning { pid: u32 },

    #[error("Failed to spawn bot process: {reason}")]
    SpawnFailed { reason: String },

    #[error("Process {pid} did not exit within {timeout_secs}s after SIGTERM")]
    StopTimeout { pid: u32, timeout_secs: u64 },

    #[error("Invalid PID file at {path}: {reason}")]
    BadPidFile { path: PathBuf, reason: String },
}

/// Errors related to systemd unit management
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("systemctl {verb} {unit} failed: {reason}")]
    SystemctlFailed {
        verb: String,
        unit: String,
        reason: String,
    },

    #[error("Cannot write unit file {path}: {reason}")]
    UnitWriteFailed { path: PathBuf, reason: String },

    #[error("systemd is not available on this host")]
    SystemdUnavailable,
}

/// Errors raised by the `.env` document model
#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("Malformed line {line} in env file: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("Invalid key {key:?}: keys must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidKey { key: String },

    #[error("Missing required key: {key}")]
    MissingKey { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_formatting() {
        let err = LifecycleError::AlreadyRunning { pid: 4242 };
        assert!(err.to_string().contains("4242"));

        let err = LifecycleError::StopTimeout {
            pid: 17,
            timeout_secs: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("10s"));
    }

    #[test]
    fn test_env_file_error_formatting() {
        let err = EnvFileError::MalformedLine {
            line: 3,
            content: "NOT A PAIR".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("NOT A PAIR"));
    }
}
