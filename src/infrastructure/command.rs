use crate::domain::ports::{CommandOutput, CommandRunner, ProcessProbe};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Real runner backed by `std::process::Command`.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        debug!("exec: {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<i32> {
        debug!("exec (interactive): {} {}", program, args.join(" "));

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .with_context(|| format!("Failed to execute {}", program))?;

        Ok(status.code().unwrap_or(-1))
    }

    fn spawn_detached(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        log_file: &Path,
    ) -> Result<u32> {
        debug!("spawn detached: {} {} (log: {})", program, args.join(" "), log_file.display());

        let log_out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
        let log_err = log_out
            .try_clone()
            .context("Failed to clone log file handle")?;

        let child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_out))
            .stderr(Stdio::from(log_err))
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        Ok(child.id())
    }

    fn signal(&self, pid: u32, signal: &str) -> Result<()> {
        // Shelling out to kill(1) keeps the crate free of libc bindings;
        // the installer already assumes coreutils-era tooling exists.
        let output = self.run("kill", &[&format!("-{}", signal), &pid.to_string()], None)?;
        if !output.success() {
            anyhow::bail!("kill -{} {} failed: {}", signal, pid, output.detail());
        }
        Ok(())
    }
}

/// Liveness check via procfs, matching how the original scripts probed with
/// `kill -0` / `pgrep`.
pub struct ProcfsProbe;

impl ProcessProbe for ProcfsProbe {
    fn is_alive(&self, pid: u32) -> bool {
        Path::new("/proc").join(pid.to_string()).exists()
    }
}
