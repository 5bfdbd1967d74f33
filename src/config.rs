use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// How the bot process is supervised once installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supervisor {
    /// Pick systemd when systemctl is available, else fall back to Background.
    Auto,
    Systemd,
    /// Detached process tracked through a PID file.
    Background,
}

impl FromStr for Supervisor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Supervisor::Auto),
            "systemd" => Ok(Supervisor::Systemd),
            "background" => Ok(Supervisor::Background),
            _ => anyhow::bail!(
                "Invalid FLOWAI_SUPERVISOR: {}. Must be 'auto', 'systemd' or 'background'",
                s
            ),
        }
    }
}

/// Settings of the manager itself. The managed bot's own configuration lives
/// in the generated `.env` inside the install directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub install_dir: PathBuf,
    pub repo_url: String,
    pub repo_branch: String,
    pub service_name: String,
    pub python_bin: String,
    pub supervisor: Supervisor,
    pub entrypoint: String,
    pub unit_dir: PathBuf,
    pub stop_timeout_secs: u64,
    pub log_tail_lines: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let install_dir = match env::var("FLOWAI_INSTALL_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let home = env::var("HOME").context("Could not find HOME directory")?;
                PathBuf::from(home).join("flowai-bot")
            }
        };

        if !install_dir.is_absolute() {
            anyhow::bail!(
                "FLOWAI_INSTALL_DIR must be an absolute path, got: {}",
                install_dir.display()
            );
        }

        let repo_url = env::var("FLOWAI_REPO_URL")
            .unwrap_or_else(|_| "https://github.com/FlowAI-ICT/flowai-trading-bot.git".to_string());

        let repo_branch = env::var("FLOWAI_REPO_BRANCH").unwrap_or_else(|_| "main".to_string());

        let service_name =
            env::var("FLOWAI_SERVICE_NAME").unwrap_or_else(|_| "flowai-bot".to_string());

        let python_bin = env::var("FLOWAI_PYTHON_BIN").unwrap_or_else(|_| "python3".to_string());

        let supervisor_str = env::var("FLOWAI_SUPERVISOR").unwrap_or_else(|_| "auto".to_string());
        let supervisor = Supervisor::from_str(&supervisor_str)?;

        let entrypoint = env::var("FLOWAI_ENTRYPOINT").unwrap_or_else(|_| "main.py".to_string());

        let unit_dir = PathBuf::from(
            env::var("FLOWAI_UNIT_DIR").unwrap_or_else(|_| "/etc/systemd/system".to_string()),
        );

        let stop_timeout_secs = env::var("FLOWAI_STOP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("Failed to parse FLOWAI_STOP_TIMEOUT_SECS")?;

        if stop_timeout_secs == 0 {
            anyhow::bail!("FLOWAI_STOP_TIMEOUT_SECS must be greater than zero");
        }

        let log_tail_lines = env::var("FLOWAI_LOG_TAIL_LINES")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<usize>()
            .context("Failed to parse FLOWAI_LOG_TAIL_LINES")?;

        Ok(Config {
            install_dir,
            repo_url,
            repo_branch,
            service_name,
            python_bin,
            supervisor,
            entrypoint,
            unit_dir,
            stop_timeout_secs,
            log_tail_lines,
        })
    }

    /// Path of the virtualenv the installer creates.
    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir.join("venv")
    }

    /// Python interpreter inside the venv.
    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir().join("bin").join("python")
    }

    /// Manager state directory inside the install tree.
    pub fn state_dir(&self) -> PathBuf {
        self.install_dir.join(".flowaictl")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.state_dir().join("bot.pid")
    }

    pub fn env_file(&self) -> PathBuf {
        self.install_dir.join(".env")
    }

    pub fn log_file(&self) -> PathBuf {
        self.install_dir.join("logs").join("bot.log")
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.service_name))
    }
}
