use serde::Serialize;

/// Observed state of the managed bot process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessState {
    /// PID is unknown when systemd reports the unit active but has not
    /// published a MainPID yet.
    Running { pid: Option<u32> },
    Stopped,
    /// A PID file exists but the process behind it is gone.
    Stale { pid: u32 },
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running { .. })
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            ProcessState::Running { pid } => *pid,
            ProcessState::Stale { pid } => Some(*pid),
            ProcessState::Stopped => None,
        }
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Running { pid: Some(pid) } => write!(f, "running (pid {})", pid),
            ProcessState::Running { pid: None } => write!(f, "running"),
            ProcessState::Stopped => write!(f, "stopped"),
            ProcessState::Stale { pid } => write!(f, "stale pid file (pid {})", pid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        assert!(ProcessState::Running { pid: Some(7) }.is_running());
        assert!(!ProcessState::Stale { pid: 7 }.is_running());
        assert_eq!(ProcessState::Stopped.pid(), None);
        assert_eq!(ProcessState::Stale { pid: 7 }.pid(), Some(7));
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_string(&ProcessState::Running { pid: Some(42) }).unwrap();
        assert!(json.contains("\"state\":\"running\""));
        assert!(json.contains("42"));
    }
}
