use anyhow::Result;
use std::path::Path;

/// Captured outcome of a finished subprocess.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stderr when non-empty, else stdout; for error messages.
    pub fn detail(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Seam over subprocess execution so install/lifecycle logic can run against
/// a scripted mock in tests. The whole tool is synchronous by design: every
/// external step is a blocking call to apt-era tooling (git, pip, systemctl).
pub trait CommandRunner: Send + Sync {
    /// Runs to completion, capturing output. A non-zero exit is NOT an error
    /// at this level; callers decide.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;

    /// Runs with stdio inherited from the manager so the user watches the
    /// output live (training, backtests, the bot's own config wizard).
    /// Returns the exit status.
    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<i32>;

    /// Spawns a long-lived detached process with stdout/stderr appended to
    /// `log_file`, returning its PID.
    fn spawn_detached(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        log_file: &Path,
    ) -> Result<u32>;

    /// Sends a signal to a process. `signal` is a name: "TERM" or "KILL".
    fn signal(&self, pid: u32, signal: &str) -> Result<()>;
}

/// Seam over liveness checks for PIDs read back from the PID file.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
}
