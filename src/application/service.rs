//! Supervisor backend selection and systemd unit orchestration.

use crate::config::{Config, Supervisor};
use crate::domain::errors::ServiceError;
use crate::domain::manifest::Backend;
use crate::domain::ports::CommandRunner;
use crate::infrastructure::systemd::{self, Systemd};
use anyhow::Result;
use tracing::info;

/// Resolves the configured supervisor to a concrete backend. `auto` takes
/// systemd whenever systemctl answers at all, matching the original
/// installers which preferred a unit and fell back to nohup-style processes.
pub fn resolve_backend(config: &Config, runner: &dyn CommandRunner) -> Backend {
    match config.supervisor {
        Supervisor::Systemd => Backend::Systemd,
        Supervisor::Background => Backend::Background,
        Supervisor::Auto => {
            if Systemd::new(runner).available() {
                Backend::Systemd
            } else {
                Backend::Background
            }
        }
    }
}

/// Sets up supervision for the freshly installed bot. For the background
/// backend there is nothing to register; the PID file appears on first start.
pub fn install_supervision(
    config: &Config,
    runner: &dyn CommandRunner,
    backend: Backend,
) -> Result<()> {
    match backend {
        Backend::Systemd => {
            if !Systemd::new(runner).available() {
                return Err(ServiceError::SystemdUnavailable.into());
            }
            systemd::install_unit(config, runner)?;
            info!("Service {} enabled", config.service_name);
            Ok(())
        }
        Backend::Background => {
            info!("Background supervision selected; no unit to install");
            Ok(())
        }
    }
}

/// Tears supervision down again. Tolerant of partially removed state.
pub fn remove_supervision(
    config: &Config,
    runner: &dyn CommandRunner,
    backend: Backend,
) -> Result<()> {
    match backend {
        Backend::Systemd => systemd::remove_unit(config, runner),
        Backend::Background => Ok(()),
    }
}
