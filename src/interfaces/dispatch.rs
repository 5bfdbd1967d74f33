//! Maps parsed commands onto application operations. The interactive menu
//! funnels through the same entry point so both surfaces behave identically.

use crate::application::installer::Installer;
use crate::application::lifecycle::{Lifecycle, StopOutcome};
use crate::application::tasks::{self, Task};
use crate::application::{doctor, uninstaller, updater};
use crate::config::Config;
use crate::domain::env_file::EnvFile;
use crate::domain::env_schema;
use crate::domain::ports::{CommandRunner, ProcessProbe};
use crate::infrastructure::logs;
use crate::interfaces::cli::{Command, ConfigAction};
use crate::interfaces::{menu, reporter};
use anyhow::{Context, Result};
use std::io::Write;

pub struct Dispatcher<'a> {
    pub config: &'a Config,
    pub runner: &'a dyn CommandRunner,
    pub probe: &'a dyn ProcessProbe,
}

impl<'a> Dispatcher<'a> {
    pub fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Install { force } => {
                let report = Installer::new(self.config, self.runner, force).run()?;
                reporter::print_install_report(&report);
                Ok(())
            }
            Command::Start => {
                let state = Lifecycle::new(self.config, self.runner, self.probe).start()?;
                println!("✅ Bot started: {}", state);
                Ok(())
            }
            Command::Stop => {
                match Lifecycle::new(self.config, self.runner, self.probe).stop()? {
                    StopOutcome::Stopped => println!("✅ Bot stopped"),
                    StopOutcome::WasNotRunning => println!("ℹ️  Bot was not running"),
                }
                Ok(())
            }
            Command::Restart => {
                let state = Lifecycle::new(self.config, self.runner, self.probe).restart()?;
                println!("✅ Bot restarted: {}", state);
                Ok(())
            }
            Command::Status { json } => {
                let report = doctor::inspect(self.config, self.runner, self.probe)?;
                if json {
                    println!("{}", report.to_json()?);
                } else {
                    reporter::print_status(&report);
                }
                Ok(())
            }
            Command::Logs { lines } => {
                let n = lines.unwrap_or(self.config.log_tail_lines);
                let tail = logs::tail(&self.config.log_file(), n)?;
                reporter::print_log_lines(&tail);
                Ok(())
            }
            Command::Config { action } => self.config_action(action),
            Command::Train { simple } => {
                let task = if simple { Task::TrainSimple } else { Task::Train };
                tasks::run_task(self.config, self.runner, task)
            }
            Command::Backtest => tasks::run_task(self.config, self.runner, Task::Backtest),
            Command::Update => {
                let report = updater::update(self.config, self.runner, self.probe)?;
                reporter::print_update_report(&report);
                Ok(())
            }
            Command::Uninstall { yes, keep_config } => {
                if !yes && !confirm_uninstall(self.config)? {
                    println!("Uninstall cancelled.");
                    return Ok(());
                }
                let report = uninstaller::uninstall(self.config, self.runner, self.probe, keep_config)?;
                println!("✅ Removed {}", report.removed_dir.display());
                if let Some(saved) = report.saved_env {
                    println!("   Configuration saved to {}", saved.display());
                }
                Ok(())
            }
            Command::Menu => menu::run(self),
        }
    }

    fn config_action(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                let env = self.load_env()?;
                print!("{}", env.render());
                Ok(())
            }
            ConfigAction::Get { key } => {
                let env = self.load_env()?;
                match env.get(&key) {
                    Some(value) => {
                        println!("{}", value);
                        Ok(())
                    }
                    None => anyhow::bail!("Key {} not set in {}", key, self.config.env_file().display()),
                }
            }
            ConfigAction::Set { key, value } => {
                let mut env = self.load_env()?;
                env.set(&key, &value)?;
                self.save_env(&env)?;
                println!("✅ {}={}", key, value);
                Ok(())
            }
            ConfigAction::Validate => {
                let env = self.load_env()?;
                let report = env_schema::validate(&env);
                for e in &report.errors {
                    println!("❌ {}", e);
                }
                for w in &report.warnings {
                    println!("⚠️  {}", w);
                }
                if report.is_ok() {
                    println!("✅ Configuration is valid");
                    Ok(())
                } else {
                    anyhow::bail!("Configuration has {} error(s)", report.errors.len())
                }
            }
            ConfigAction::Wizard => tasks::run_task(self.config, self.runner, Task::ConfigWizard),
        }
    }

    pub fn load_env(&self) -> Result<EnvFile> {
        let path = self.config.env_file();
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {} (is the bot installed?)", path.display()))?;
        Ok(EnvFile::parse(&text)?)
    }

    pub fn save_env(&self, env: &EnvFile) -> Result<()> {
        let path = self.config.env_file();
        let temp_path = path.with_file_name(".env.tmp");
        std::fs::write(&temp_path, env.render()).context("Failed to write temp .env")?;
        std::fs::rename(&temp_path, &path).context("Failed to replace .env")?;
        Ok(())
    }
}

fn confirm_uninstall(config: &Config) -> Result<bool> {
    print!(
        "This removes {} and everything in it. Continue? [y/N] ",
        config.install_dir.display()
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
