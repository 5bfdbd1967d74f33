//! Idempotent installation pipeline for the bot tree.
//!
//! Mirrors the step sequence of the original installers: preflight checks,
//! clone, venv, Python packages, `.env` generation, supervision, manifest.
//! Every step detects "already done" on its own, so running install twice
//! converges to the same end state.

use crate::config::Config;
use crate::domain::env_schema;
use crate::domain::errors::InstallError;
use crate::domain::manifest::{Backend, Manifest};
use crate::domain::ports::CommandRunner;
use crate::application::service;
use crate::infrastructure::manifest_store::ManifestStore;
use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};

/// Minimum interpreter the bot's dependency set supports.
const MIN_PYTHON: (u32, u32) = (3, 8);

/// Fallback package set when the checkout ships no requirements.txt,
/// matching what the bot's modules import.
const DEFAULT_PACKAGES: &[&str] = &[
    "pandas",
    "numpy",
    "scikit-learn",
    "scipy",
    "joblib",
    "schedule",
    "python-dotenv",
    "yfinance",
    "requests",
    "python-telegram-bot",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped(String),
    /// Step completed but some parts degraded to warnings (package installs).
    Degraded(Vec<String>),
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub steps: Vec<(String, StepOutcome)>,
    pub backend: Option<Backend>,
}

impl InstallReport {
    fn record(&mut self, name: &str, outcome: StepOutcome) {
        self.steps.push((name.to_string(), outcome));
    }

    /// True when every stateful step was skipped, i.e. nothing was left to
    /// do. Pure checks (preflight) and mkdir-style steps don't count.
    pub fn already_installed(&self) -> bool {
        let stateful: Vec<_> = self
            .steps
            .iter()
            .filter(|(name, _)| name != "preflight" && name != "directories")
            .collect();
        !stateful.is_empty()
            && stateful
                .iter()
                .all(|(_, o)| matches!(o, StepOutcome::Skipped(_)))
    }
}

/// Cheap installed-state check used by lifecycle commands: the manifest must
/// exist and match on-disk reality (repo and venv actually present).
pub fn is_installed(config: &Config) -> bool {
    let manifest_present = ManifestStore::new(config.state_dir())
        .load()
        .map(|m| m.is_some())
        .unwrap_or(false);

    manifest_present && config.install_dir.join(".git").exists() && config.venv_python().exists()
}

pub fn require_installed(config: &Config) -> Result<()> {
    if !is_installed(config) {
        return Err(InstallError::NotInstalled {
            dir: config.install_dir.clone(),
        }
        .into());
    }
    Ok(())
}

pub struct Installer<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    force: bool,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, force: bool) -> Self {
        Self {
            config,
            runner,
            force,
        }
    }

    pub fn run(&self) -> Result<InstallReport> {
        let mut report = InstallReport::default();

        let python_version = self.preflight()?;
        report.record("preflight", StepOutcome::Done);

        report.record("clone", self.clone_repo()?);
        self.create_dirs()?;
        report.record("directories", StepOutcome::Done);
        let venv_outcome = self.create_venv()?;
        let fresh_venv = !matches!(venv_outcome, StepOutcome::Skipped(_));
        report.record("venv", venv_outcome);
        report.record("packages", self.install_packages(fresh_venv)?);
        report.record("env-file", self.write_env_file()?);

        let backend = service::resolve_backend(self.config, self.runner);
        report.record("supervision", self.install_supervision(backend)?);
        report.backend = Some(backend);

        self.write_manifest(&report, python_version, backend)?;
        info!(
            "Install complete at {} (backend: {})",
            self.config.install_dir.display(),
            backend
        );
        Ok(report)
    }

    /// Hard requirements: a new enough Python and git on PATH.
    fn preflight(&self) -> Result<String> {
        let python = self
            .runner
            .run(&self.config.python_bin, &["--version"], None)
            .map_err(|_| InstallError::PythonMissing {
                bin: self.config.python_bin.clone(),
            })?;

        if !python.success() {
            return Err(InstallError::PythonMissing {
                bin: self.config.python_bin.clone(),
            }
            .into());
        }

        // Old interpreters print the version on stderr
        let version_line = if python.stdout.trim().is_empty() {
            python.stderr.trim().to_string()
        } else {
            python.stdout.trim().to_string()
        };

        let (major, minor) = parse_python_version(&version_line).ok_or_else(|| {
            InstallError::PythonMissing {
                bin: self.config.python_bin.clone(),
            }
        })?;

        if (major, minor) < MIN_PYTHON {
            return Err(InstallError::PythonTooOld {
                found: version_line,
                required: format!("{}.{}", MIN_PYTHON.0, MIN_PYTHON.1),
            }
            .into());
        }

        let git = self.runner.run("git", &["--version"], None);
        match git {
            Ok(out) if out.success() => {}
            _ => {
                return Err(InstallError::ToolMissing {
                    tool: "git".to_string(),
                }
                .into())
            }
        }

        info!("Preflight ok: {}", version_line);
        Ok(version_line)
    }

    fn clone_repo(&self) -> Result<StepOutcome> {
        let dir = &self.config.install_dir;

        if dir.join(".git").exists() {
            return Ok(StepOutcome::Skipped("repository already cloned".into()));
        }

        let non_empty = dir.exists() && dir.read_dir().map(|mut d| d.next().is_some()).unwrap_or(true);
        if non_empty {
            return Err(InstallError::CloneFailed {
                reason: format!(
                    "{} exists and is not a git checkout; move it aside or pick another FLOWAI_INSTALL_DIR",
                    dir.display()
                ),
            }
            .into());
        }

        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent).context("Failed to create install parent directory")?;
        }

        info!("Cloning {} ({})", self.config.repo_url, self.config.repo_branch);
        let dir_str = dir.to_string_lossy().to_string();
        let output = self.runner.run(
            "git",
            &[
                "clone",
                "--branch",
                &self.config.repo_branch,
                "--single-branch",
                &self.config.repo_url,
                &dir_str,
            ],
            None,
        )?;

        if !output.success() {
            return Err(InstallError::CloneFailed {
                reason: output.detail().to_string(),
            }
            .into());
        }
        Ok(StepOutcome::Done)
    }

    fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.config.install_dir.join("logs"))
            .context("Failed to create logs directory")?;
        fs::create_dir_all(self.config.state_dir())
            .context("Failed to create manager state directory")?;
        Ok(())
    }

    fn create_venv(&self) -> Result<StepOutcome> {
        let venv = self.config.venv_dir();

        if self.config.venv_python().exists() {
            if !self.force {
                return Ok(StepOutcome::Skipped("virtualenv already present".into()));
            }
            info!("Force install: recreating virtualenv");
            fs::remove_dir_all(&venv).context("Failed to remove old virtualenv")?;
        }

        let venv_str = venv.to_string_lossy().to_string();
        let output = self.runner.run(
            &self.config.python_bin,
            &["-m", "venv", &venv_str],
            Some(&self.config.install_dir),
        )?;

        if !output.success() {
            return Err(InstallError::VenvFailed {
                path: venv,
                reason: output.detail().to_string(),
            }
            .into());
        }
        Ok(StepOutcome::Done)
    }

    /// Best-effort: a package that fails to build is a warning, not an abort.
    /// The original installers behaved the same way (`|| print_warning`).
    /// Refreshing packages in an existing venv is the updater's job.
    fn install_packages(&self, fresh_venv: bool) -> Result<StepOutcome> {
        if !fresh_venv {
            return Ok(StepOutcome::Skipped(
                "virtualenv untouched; run 'update' to refresh packages".into(),
            ));
        }

        let python = self.config.venv_python().to_string_lossy().to_string();
        let mut warnings = Vec::new();

        let pip_upgrade = self.runner.run(
            &python,
            &["-m", "pip", "install", "--upgrade", "pip"],
            Some(&self.config.install_dir),
        )?;
        if !pip_upgrade.success() {
            warn!("pip self-upgrade failed: {}", pip_upgrade.detail());
            warnings.push(format!("pip upgrade: {}", pip_upgrade.detail()));
        }

        let requirements = self.config.install_dir.join("requirements.txt");
        if requirements.exists() {
            let req_str = requirements.to_string_lossy().to_string();
            let output = self.runner.run(
                &python,
                &["-m", "pip", "install", "-r", &req_str],
                Some(&self.config.install_dir),
            )?;
            if !output.success() {
                warn!("requirements.txt install failed: {}", output.detail());
                warnings.push(format!("requirements.txt: {}", output.detail()));
            }
        } else {
            info!("No requirements.txt; installing built-in package set");
            for package in DEFAULT_PACKAGES {
                let output = self.runner.run(
                    &python,
                    &["-m", "pip", "install", package],
                    Some(&self.config.install_dir),
                )?;
                if !output.success() {
                    warn!("Package {} failed to install: {}", package, output.detail());
                    warnings.push(format!("{}: {}", package, output.detail()));
                }
            }
        }

        if warnings.is_empty() {
            Ok(StepOutcome::Done)
        } else {
            Ok(StepOutcome::Degraded(warnings))
        }
    }

    /// Writes the default `.env` once. Never clobbers an existing file, even
    /// under --force: the file is user data after first generation.
    fn write_env_file(&self) -> Result<StepOutcome> {
        let path = self.config.env_file();
        if path.exists() {
            return Ok(StepOutcome::Skipped(".env already exists, keeping it".into()));
        }

        fs::write(&path, env_schema::default_env_file().render())
            .context("Failed to write default .env")?;
        info!("Wrote default configuration to {}", path.display());
        Ok(StepOutcome::Done)
    }

    fn install_supervision(&self, backend: Backend) -> Result<StepOutcome> {
        match backend {
            Backend::Systemd if self.config.unit_path().exists() && !self.force => {
                Ok(StepOutcome::Skipped("unit already installed".into()))
            }
            Backend::Systemd => {
                service::install_supervision(self.config, self.runner, backend)?;
                Ok(StepOutcome::Done)
            }
            Backend::Background => Ok(StepOutcome::Skipped(
                "background supervision needs no setup".into(),
            )),
        }
    }

    fn write_manifest(
        &self,
        report: &InstallReport,
        python_version: String,
        backend: Backend,
    ) -> Result<()> {
        let store = ManifestStore::new(self.config.state_dir());

        // Re-installs keep the original identity and install date
        let mut m = match store.load()? {
            Some(existing) => existing,
            None => Manifest::new(
                self.config.repo_url.clone(),
                self.config.repo_branch.clone(),
                python_version.clone(),
                backend,
            ),
        };
        m.python_version = python_version;
        m.backend = backend;
        m.manager_version = env!("CARGO_PKG_VERSION").to_string();
        for (name, outcome) in &report.steps {
            if !matches!(outcome, StepOutcome::Skipped(_)) {
                m.record_step(name);
            }
        }
        m.touch();
        store.save(&m)
    }
}

fn parse_python_version(line: &str) -> Option<(u32, u32)> {
    // "Python 3.11.2" -> (3, 11)
    let version = line.split_whitespace().nth(1)?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_version() {
        assert_eq!(parse_python_version("Python 3.11.2"), Some((3, 11)));
        assert_eq!(parse_python_version("Python 2.7.18"), Some((2, 7)));
        assert_eq!(parse_python_version("zsh: command not found"), None);
        assert_eq!(parse_python_version(""), None);
    }

    #[test]
    fn test_report_already_installed_detection() {
        let mut report = InstallReport::default();
        report.record("clone", StepOutcome::Skipped("done".into()));
        report.record("venv", StepOutcome::Skipped("done".into()));
        assert!(report.already_installed());

        report.record("packages", StepOutcome::Done);
        assert!(!report.already_installed());

        assert!(!InstallReport::default().already_installed());
    }
}
