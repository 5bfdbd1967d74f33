use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supervisor backend recorded at install time, after `auto` resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Systemd,
    Background,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Systemd => write!(f, "systemd"),
            Backend::Background => write!(f, "background"),
        }
    }
}

/// Record of what the installer did, persisted as JSON inside the install
/// tree. Its presence (together with the repo and venv actually existing on
/// disk) is the "already installed" signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub install_id: Uuid,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub repo_url: String,
    pub repo_branch: String,
    pub python_version: String,
    pub backend: Backend,
    pub manager_version: String,
    pub completed_steps: Vec<String>,
}

impl Manifest {
    pub fn new(
        repo_url: String,
        repo_branch: String,
        python_version: String,
        backend: Backend,
    ) -> Self {
        let now = Utc::now();
        Self {
            install_id: Uuid::new_v4(),
            installed_at: now,
            updated_at: now,
            repo_url,
            repo_branch,
            python_version,
            backend,
            manager_version: env!("CARGO_PKG_VERSION").to_string(),
            completed_steps: Vec::new(),
        }
    }

    pub fn record_step(&mut self, step: &str) {
        if !self.completed_steps.iter().any(|s| s == step) {
            self.completed_steps.push(step.to_string());
        }
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_step_is_idempotent() {
        let mut m = Manifest::new(
            "https://example.com/bot.git".into(),
            "main".into(),
            "Python 3.11.2".into(),
            Backend::Background,
        );
        m.record_step("clone");
        m.record_step("venv");
        m.record_step("clone");
        assert_eq!(m.completed_steps, vec!["clone", "venv"]);
    }

    #[test]
    fn test_manifest_round_trips_through_json() {
        let m = Manifest::new(
            "https://example.com/bot.git".into(),
            "main".into(),
            "Python 3.11.2".into(),
            Backend::Systemd,
        );
        let json = serde_json::to_string(&m).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.install_id, m.install_id);
        assert_eq!(back.backend, Backend::Systemd);
    }
}
