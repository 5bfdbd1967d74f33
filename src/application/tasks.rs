//! One-shot foreground runs of the bot's auxiliary entrypoints.
//!
//! These stay opaque executables: the manager picks the right script, runs
//! it through the venv interpreter with the install dir as working directory,
//! and only interprets the exit code.

use crate::application::installer;
use crate::config::Config;
use crate::domain::ports::CommandRunner;
use anyhow::Result;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Full model training (`train_model.py`).
    Train,
    /// Reduced training pipeline (`simple_train_model.py`).
    TrainSimple,
    /// Historical backtest run; results land in the bot's JSON dumps.
    Backtest,
    /// The bot's own interactive configuration wizard.
    ConfigWizard,
}

impl Task {
    pub fn script(&self) -> &'static str {
        match self {
            Task::Train => "train_model.py",
            Task::TrainSimple => "simple_train_model.py",
            Task::Backtest => "backtest_engine.py",
            Task::ConfigWizard => "config_wizard.py",
        }
    }
}

pub fn run_task(config: &Config, runner: &dyn CommandRunner, task: Task) -> Result<()> {
    installer::require_installed(config)?;

    let script_path = config.install_dir.join(task.script());
    if !script_path.exists() {
        anyhow::bail!(
            "The checkout has no {}; update the bot first",
            task.script()
        );
    }

    let python = config.venv_python().to_string_lossy().to_string();
    info!("Running {} in {}", task.script(), config.install_dir.display());

    let status = runner.run_interactive(&python, &[task.script()], &config.install_dir)?;
    if status != 0 {
        anyhow::bail!("{} exited with status {}", task.script(), status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_script_mapping() {
        assert_eq!(Task::Train.script(), "train_model.py");
        assert_eq!(Task::TrainSimple.script(), "simple_train_model.py");
        assert_eq!(Task::Backtest.script(), "backtest_engine.py");
        assert_eq!(Task::ConfigWizard.script(), "config_wizard.py");
    }
}
