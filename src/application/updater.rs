//! Update flow: force-sync the checkout to the remote branch, refresh
//! Python packages, and bring the bot back up only if it was running.

use crate::application::installer;
use crate::application::lifecycle::Lifecycle;
use crate::config::Config;
use crate::domain::ports::{CommandRunner, ProcessProbe};
use crate::infrastructure::manifest_store::ManifestStore;
use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug)]
pub struct UpdateReport {
    pub was_running: bool,
    pub restarted: bool,
    pub head: Option<String>,
}

pub fn update(
    config: &Config,
    runner: &dyn CommandRunner,
    probe: &dyn ProcessProbe,
) -> Result<UpdateReport> {
    installer::require_installed(config)?;

    let lifecycle = Lifecycle::new(config, runner, probe);
    let was_running = lifecycle.status()?.is_running();

    if was_running {
        info!("Stopping bot before update");
        lifecycle.stop()?;
    }

    let fetch = runner.run("git", &["fetch", "origin"], Some(&config.install_dir))?;
    if !fetch.success() {
        anyhow::bail!("git fetch failed: {}", fetch.detail());
    }

    // The shell installers shipped a destructive "force update": local edits
    // to bot code are discarded, the .env outside git is untouched.
    let target = format!("origin/{}", config.repo_branch);
    let reset = runner.run(
        "git",
        &["reset", "--hard", &target],
        Some(&config.install_dir),
    )?;
    if !reset.success() {
        anyhow::bail!("git reset --hard {} failed: {}", target, reset.detail());
    }

    let head = runner
        .run("git", &["rev-parse", "--short", "HEAD"], Some(&config.install_dir))
        .ok()
        .filter(|o| o.success())
        .map(|o| o.stdout.trim().to_string());

    // Dependency refresh is best-effort, same as at install time
    let python = config.venv_python().to_string_lossy().to_string();
    let requirements = config.install_dir.join("requirements.txt");
    if requirements.exists() {
        let req_str = requirements.to_string_lossy().to_string();
        let pip = runner.run(
            &python,
            &["-m", "pip", "install", "-r", &req_str],
            Some(&config.install_dir),
        )?;
        if !pip.success() {
            warn!("Package refresh failed: {}", pip.detail());
        }
    }

    let store = ManifestStore::new(config.state_dir());
    if let Some(mut manifest) = store.load().context("Failed to load manifest")? {
        manifest.record_step("update");
        store.save(&manifest)?;
    }

    let mut restarted = false;
    if was_running {
        info!("Update applied, restarting bot");
        lifecycle.start()?;
        restarted = true;
    }

    Ok(UpdateReport {
        was_running,
        restarted,
        head,
    })
}
