//! Process lifecycle control: start, stop, restart, status.
//!
//! Two backends share one surface. Under systemd the verbs delegate to
//! systemctl; under background supervision the bot is a detached process
//! tracked through a PID file, and start/stop enforce the single-instance
//! rule themselves.

use crate::application::installer;
use crate::application::service;
use crate::config::Config;
use crate::domain::errors::LifecycleError;
use crate::domain::manifest::Backend;
use crate::domain::ports::{CommandRunner, ProcessProbe};
use crate::domain::process::ProcessState;
use crate::infrastructure::pid_file::PidFile;
use crate::infrastructure::systemd::Systemd;
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Grace period after SIGKILL before giving up entirely.
const KILL_WAIT: Duration = Duration::from_secs(2);

/// Outcome of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// Nothing was running; not an error, the menus treat it as a notice.
    WasNotRunning,
}

pub struct Lifecycle<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    probe: &'a dyn ProcessProbe,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        probe: &'a dyn ProcessProbe,
    ) -> Self {
        Self {
            config,
            runner,
            probe,
        }
    }

    fn backend(&self) -> Backend {
        service::resolve_backend(self.config, self.runner)
    }

    fn pid_file(&self) -> PidFile {
        PidFile::new(self.config.pid_file())
    }

    pub fn status(&self) -> Result<ProcessState> {
        match self.backend() {
            Backend::Systemd => {
                let systemd = Systemd::new(self.runner);
                if systemd.is_active(&self.config.service_name)? {
                    Ok(ProcessState::Running {
                        pid: systemd.main_pid(&self.config.service_name),
                    })
                } else {
                    Ok(ProcessState::Stopped)
                }
            }
            Backend::Background => {
                let pid_file = self.pid_file();
                match pid_file.read()? {
                    None => Ok(ProcessState::Stopped),
                    Some(pid) if self.probe.is_alive(pid) => {
                        Ok(ProcessState::Running { pid: Some(pid) })
                    }
                    Some(pid) => Ok(ProcessState::Stale { pid }),
                }
            }
        }
    }

    /// Starts the bot. Refuses while an instance is already live; clears a
    /// stale PID file on the way.
    pub fn start(&self) -> Result<ProcessState> {
        installer::require_installed(self.config)?;

        match self.backend() {
            Backend::Systemd => {
                let systemd = Systemd::new(self.runner);
                if systemd.is_active(&self.config.service_name)? {
                    anyhow::bail!(
                        "Service {} is already active; use restart instead",
                        self.config.service_name
                    );
                }
                systemd.systemctl("start", &self.config.service_name)?;
                info!("Service {} started", self.config.service_name);
                Ok(ProcessState::Running {
                    pid: systemd.main_pid(&self.config.service_name),
                })
            }
            Backend::Background => {
                let pid_file = self.pid_file();
                match self.status()? {
                    ProcessState::Running { pid } => {
                        return Err(LifecycleError::AlreadyRunning {
                            pid: pid.unwrap_or_default(),
                        }
                        .into());
                    }
                    ProcessState::Stale { pid } => {
                        warn!("Clearing stale PID file (pid {} is gone)", pid);
                        pid_file.clear()?;
                    }
                    ProcessState::Stopped => {}
                }

                std::fs::create_dir_all(self.config.install_dir.join("logs"))?;

                let python = self.config.venv_python().to_string_lossy().to_string();
                let pid = self
                    .runner
                    .spawn_detached(
                        &python,
                        &[&self.config.entrypoint],
                        &self.config.install_dir,
                        &self.config.log_file(),
                    )
                    .map_err(|e| LifecycleError::SpawnFailed {
                        reason: e.to_string(),
                    })?;

                pid_file.write(pid)?;
                info!("Bot started (pid {})", pid);
                Ok(ProcessState::Running { pid: Some(pid) })
            }
        }
    }

    /// Stops the bot: SIGTERM first, SIGKILL after the configured timeout.
    pub fn stop(&self) -> Result<StopOutcome> {
        match self.backend() {
            Backend::Systemd => {
                let systemd = Systemd::new(self.runner);
                if !systemd.is_active(&self.config.service_name)? {
                    return Ok(StopOutcome::WasNotRunning);
                }
                systemd.systemctl("stop", &self.config.service_name)?;
                info!("Service {} stopped", self.config.service_name);
                Ok(StopOutcome::Stopped)
            }
            Backend::Background => {
                let pid_file = self.pid_file();
                let pid = match self.status()? {
                    ProcessState::Stopped => return Ok(StopOutcome::WasNotRunning),
                    ProcessState::Stale { pid } => {
                        warn!("Clearing stale PID file (pid {} is gone)", pid);
                        pid_file.clear()?;
                        return Ok(StopOutcome::WasNotRunning);
                    }
                    ProcessState::Running { pid } => pid.unwrap_or_default(),
                };

                info!("Sending SIGTERM to pid {}", pid);
                self.runner.signal(pid, "TERM")?;

                if !self.wait_for_exit(pid, Duration::from_secs(self.config.stop_timeout_secs)) {
                    warn!(
                        "Pid {} still alive after {}s, escalating to SIGKILL",
                        pid, self.config.stop_timeout_secs
                    );
                    self.runner.signal(pid, "KILL")?;
                    if !self.wait_for_exit(pid, KILL_WAIT) {
                        return Err(LifecycleError::StopTimeout {
                            pid,
                            timeout_secs: self.config.stop_timeout_secs,
                        }
                        .into());
                    }
                }

                pid_file.clear()?;
                info!("Bot stopped");
                Ok(StopOutcome::Stopped)
            }
        }
    }

    /// Stop (tolerating already-stopped) then start. Under background
    /// supervision the returned state carries the fresh PID.
    pub fn restart(&self) -> Result<ProcessState> {
        match self.backend() {
            Backend::Systemd => {
                installer::require_installed(self.config)?;
                let systemd = Systemd::new(self.runner);
                systemd.systemctl("restart", &self.config.service_name)?;
                info!("Service {} restarted", self.config.service_name);
                Ok(ProcessState::Running {
                    pid: systemd.main_pid(&self.config.service_name),
                })
            }
            Backend::Background => {
                self.stop()?;
                self.start()
            }
        }
    }

    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if !self.probe.is_alive(pid) {
                return true;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        !self.probe.is_alive(pid)
    }
}
