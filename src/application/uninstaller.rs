//! Teardown: stop the bot, remove supervision, delete the install tree.

use crate::application::lifecycle::Lifecycle;
use crate::application::service;
use crate::config::Config;
use crate::domain::manifest::Backend;
use crate::domain::ports::{CommandRunner, ProcessProbe};
use crate::infrastructure::manifest_store::ManifestStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug)]
pub struct UninstallReport {
    pub removed_dir: PathBuf,
    pub saved_env: Option<PathBuf>,
}

/// Confirmation is the caller's job (CLI `--yes` flag or the menu prompt);
/// this function assumes consent and proceeds.
pub fn uninstall(
    config: &Config,
    runner: &dyn CommandRunner,
    probe: &dyn ProcessProbe,
    keep_config: bool,
) -> Result<UninstallReport> {
    if !config.install_dir.exists() {
        anyhow::bail!(
            "Nothing to uninstall: {} does not exist",
            config.install_dir.display()
        );
    }

    let lifecycle = Lifecycle::new(config, runner, probe);
    if let Err(e) = lifecycle.stop() {
        // A broken half-install must still be removable
        warn!("Could not stop bot cleanly during uninstall: {}", e);
    }

    let backend = ManifestStore::new(config.state_dir())
        .load()
        .ok()
        .flatten()
        .map(|m| m.backend)
        .unwrap_or_else(|| service::resolve_backend(config, runner));

    if backend == Backend::Systemd || config.unit_path().exists() {
        if let Err(e) = service::remove_supervision(config, runner, Backend::Systemd) {
            warn!("Could not remove systemd unit: {}", e);
        }
    }

    let saved_env = if keep_config && config.env_file().exists() {
        let backup = config
            .install_dir
            .with_file_name(format!("{}.env.saved", config.service_name));
        fs::copy(config.env_file(), &backup).context("Failed to back up .env")?;
        info!("Saved configuration to {}", backup.display());
        Some(backup)
    } else {
        None
    };

    fs::remove_dir_all(&config.install_dir).context("Failed to remove install directory")?;
    info!("Removed {}", config.install_dir.display());

    Ok(UninstallReport {
        removed_dir: config.install_dir.clone(),
        saved_env,
    })
}
