use crate::config::Config;
use crate::domain::errors::ServiceError;
use crate::domain::ports::CommandRunner;
use anyhow::Result;
use std::fs;
use tracing::{debug, info};

/// Renders the unit text for the bot service.
///
/// Contract with the external bot: no arguments, `.env` read from the working
/// directory, logs under `logs/bot.log`, non-zero exit on fatal startup
/// failure (which is what Restart=on-failure reacts to).
pub fn render_unit(config: &Config) -> String {
    format!(
        "[Unit]\n\
         Description=FlowAI-ICT Trading Bot\n\
         After=network-online.target\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         WorkingDirectory={workdir}\n\
         ExecStart={python} {entrypoint}\n\
         EnvironmentFile=-{env_file}\n\
         Restart=on-failure\n\
         RestartSec=10\n\
         SyslogIdentifier={service}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        workdir = config.install_dir.display(),
        python = config.venv_python().display(),
        entrypoint = config.entrypoint,
        env_file = config.env_file().display(),
        service = config.service_name,
    )
}

/// Thin systemctl wrapper; every verb goes through the command runner so the
/// whole service path is testable.
pub struct Systemd<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Systemd<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Whether systemd is usable at all on this host.
    pub fn available(&self) -> bool {
        match self.runner.run("systemctl", &["is-system-running"], None) {
            // is-system-running exits non-zero on degraded systems that are
            // still perfectly able to manage units, so any answer counts.
            Ok(_) => true,
            Err(_) => false,
        }
    }

    pub fn systemctl(&self, verb: &str, unit: &str) -> Result<(), ServiceError> {
        debug!("systemctl {} {}", verb, unit);
        let output = self
            .runner
            .run("systemctl", &[verb, unit], None)
            .map_err(|e| ServiceError::SystemctlFailed {
                verb: verb.to_string(),
                unit: unit.to_string(),
                reason: e.to_string(),
            })?;

        if !output.success() {
            return Err(ServiceError::SystemctlFailed {
                verb: verb.to_string(),
                unit: unit.to_string(),
                reason: output.detail().to_string(),
            });
        }
        Ok(())
    }

    pub fn daemon_reload(&self) -> Result<(), ServiceError> {
        let output = self
            .runner
            .run("systemctl", &["daemon-reload"], None)
            .map_err(|e| ServiceError::SystemctlFailed {
                verb: "daemon-reload".to_string(),
                unit: String::new(),
                reason: e.to_string(),
            })?;
        if !output.success() {
            return Err(ServiceError::SystemctlFailed {
                verb: "daemon-reload".to_string(),
                unit: String::new(),
                reason: output.detail().to_string(),
            });
        }
        Ok(())
    }

    /// `systemctl is-active` answer; "active" means running.
    pub fn is_active(&self, unit: &str) -> Result<bool, ServiceError> {
        let output = self
            .runner
            .run("systemctl", &["is-active", unit], None)
            .map_err(|e| ServiceError::SystemctlFailed {
                verb: "is-active".to_string(),
                unit: unit.to_string(),
                reason: e.to_string(),
            })?;
        Ok(output.stdout.trim() == "active")
    }

    /// Main PID of the unit as systemd reports it, when running.
    pub fn main_pid(&self, unit: &str) -> Option<u32> {
        let output = self
            .runner
            .run("systemctl", &["show", "--property=MainPID", unit], None)
            .ok()?;
        let value = output.stdout.trim().strip_prefix("MainPID=")?.to_string();
        match value.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(pid) => Some(pid),
        }
    }
}

/// Writes the unit file and registers it with systemd.
pub fn install_unit(config: &Config, runner: &dyn CommandRunner) -> Result<()> {
    let unit_path = config.unit_path();
    let text = render_unit(config);

    fs::write(&unit_path, text).map_err(|e| ServiceError::UnitWriteFailed {
        path: unit_path.clone(),
        reason: e.to_string(),
    })?;
    info!("Wrote systemd unit {}", unit_path.display());

    let systemd = Systemd::new(runner);
    systemd.daemon_reload()?;
    systemd.systemctl("enable", &config.service_name)?;
    Ok(())
}

/// Stops, disables and deletes the unit. Missing pieces are tolerated so
/// uninstall stays idempotent.
pub fn remove_unit(config: &Config, runner: &dyn CommandRunner) -> Result<()> {
    let systemd = Systemd::new(runner);
    if let Err(e) = systemd.systemctl("stop", &config.service_name) {
        debug!("stop during unit removal: {}", e);
    }
    if let Err(e) = systemd.systemctl("disable", &config.service_name) {
        debug!("disable during unit removal: {}", e);
    }

    let unit_path = config.unit_path();
    match fs::remove_file(&unit_path) {
        Ok(()) => info!("Removed systemd unit {}", unit_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ServiceError::UnitWriteFailed {
                path: unit_path,
                reason: e.to_string(),
            }
            .into())
        }
    }

    systemd.daemon_reload()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockSystem;
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config {
            install_dir: PathBuf::from("/opt/flowai"),
            repo_url: "https://example.com/bot.git".into(),
            repo_branch: "main".into(),
            service_name: "flowai-bot".into(),
            python_bin: "python3".into(),
            supervisor: crate::config::Supervisor::Systemd,
            entrypoint: "main.py".into(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            stop_timeout_secs: 10,
            log_tail_lines: 50,
        }
    }

    #[test]
    fn test_render_unit_contract() {
        let unit = render_unit(&test_config());
        assert!(unit.contains("Type=simple"));
        assert!(unit.contains("Restart=on-failure"));
        assert!(unit.contains("WorkingDirectory=/opt/flowai"));
        assert!(unit.contains("ExecStart=/opt/flowai/venv/bin/python main.py"));
        assert!(unit.contains("EnvironmentFile=-/opt/flowai/.env"));
        assert!(unit.contains("WantedBy=multi-user.target"));
    }

    #[test]
    fn test_is_active_parses_answer() {
        let mock = MockSystem::new();
        mock.succeed_with("systemctl is-active", "active\n");
        let systemd = Systemd::new(&mock);
        assert!(systemd.is_active("flowai-bot").unwrap());

        mock.succeed_with("systemctl is-active", "inactive\n");
        assert!(!systemd.is_active("flowai-bot").unwrap());
    }

    #[test]
    fn test_main_pid_zero_means_none() {
        let mock = MockSystem::new();
        mock.succeed_with("systemctl show", "MainPID=0\n");
        let systemd = Systemd::new(&mock);
        assert_eq!(systemd.main_pid("flowai-bot"), None);

        mock.succeed_with("systemctl show", "MainPID=912\n");
        assert_eq!(systemd.main_pid("flowai-bot"), Some(912));
    }

    #[test]
    fn test_systemctl_failure_carries_stderr() {
        let mock = MockSystem::new();
        mock.fail("systemctl start", "Unit flowai-bot.service not found");
        let systemd = Systemd::new(&mock);
        let err = systemd.systemctl("start", "flowai-bot").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
