//! Aggregated health report over everything the manager knows: install
//! state, supervision, process status, configuration findings, log activity.

use crate::application::installer;
use crate::application::lifecycle::Lifecycle;
use crate::application::service;
use crate::config::Config;
use crate::domain::env_file::EnvFile;
use crate::domain::env_schema::{self, ValidationReport};
use crate::domain::manifest::{Backend, Manifest};
use crate::domain::ports::{CommandRunner, ProcessProbe};
use crate::domain::process::ProcessState;
use crate::infrastructure::logs;
use crate::infrastructure::manifest_store::ManifestStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LogInfo {
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    pub tail: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub installed: bool,
    pub install_dir: String,
    pub backend: Backend,
    pub process: ProcessState,
    pub venv_present: bool,
    pub manifest: Option<Manifest>,
    pub env_findings: Option<ValidationReport>,
    pub log: Option<LogInfo>,
}

pub fn inspect(
    config: &Config,
    runner: &dyn CommandRunner,
    probe: &dyn ProcessProbe,
) -> Result<StatusReport> {
    let installed = installer::is_installed(config);
    let manifest = ManifestStore::new(config.state_dir()).load().unwrap_or(None);

    let backend = manifest
        .as_ref()
        .map(|m| m.backend)
        .unwrap_or_else(|| service::resolve_backend(config, runner));

    let process = if installed {
        Lifecycle::new(config, runner, probe)
            .status()
            .unwrap_or(ProcessState::Stopped)
    } else {
        ProcessState::Stopped
    };

    let env_findings = match std::fs::read_to_string(config.env_file()) {
        Ok(text) => match EnvFile::parse(&text) {
            Ok(env) => Some(env_schema::validate(&env)),
            Err(e) => Some(ValidationReport {
                errors: vec![format!("unparseable .env: {}", e)],
                warnings: Vec::new(),
            }),
        },
        Err(_) => None,
    };

    let log = logs::stat(&config.log_file()).map(|(size_bytes, modified)| LogInfo {
        size_bytes,
        modified,
        tail: logs::tail(&config.log_file(), config.log_tail_lines).unwrap_or_default(),
    });

    Ok(StatusReport {
        installed,
        install_dir: config.install_dir.display().to_string(),
        backend,
        process,
        venv_present: config.venv_python().exists(),
        manifest,
        env_findings,
        log,
    })
}

impl StatusReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
