//! Scripted stand-ins for the OS seams, used by unit and integration tests.

use crate::domain::ports::{CommandOutput, CommandRunner, ProcessProbe};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    responses: HashMap<String, CommandOutput>,
    alive: HashSet<u32>,
    term_ignored: HashSet<u32>,
    next_pid: u32,
}

/// Mock command runner + process probe sharing one world: spawned PIDs are
/// alive until signalled, TERM can be configured to be ignored so stop
/// escalation paths are reachable.
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSystem {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_pid: 1000,
                ..Default::default()
            })),
        }
    }

    /// Scripts the output for any command line starting with `prefix`
    /// (program and args joined with spaces).
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(prefix.to_string(), output);
    }

    /// Shorthand: command lines starting with `prefix` fail with this stderr.
    pub fn fail(&self, prefix: &str, stderr: &str) {
        self.respond(
            prefix,
            CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
    }

    /// Shorthand: command lines starting with `prefix` succeed with stdout.
    pub fn succeed_with(&self, prefix: &str, stdout: &str) {
        self.respond(
            prefix,
            CommandOutput {
                status: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn alive_pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.state.lock().unwrap().alive.iter().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Marks a PID alive without going through spawn (for stale-file setups
    /// the test wants to control).
    pub fn set_alive(&self, pid: u32) {
        self.state.lock().unwrap().alive.insert(pid);
    }

    /// Makes a PID survive SIGTERM so stop must escalate to SIGKILL.
    pub fn ignore_term(&self, pid: u32) {
        self.state.lock().unwrap().term_ignored.insert(pid);
    }
}

impl CommandRunner for MockSystem {
    fn run(&self, program: &str, args: &[&str], _cwd: Option<&Path>) -> Result<CommandOutput> {
        let line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };

        let mut state = self.state.lock().unwrap();
        state.calls.push(line.clone());

        let scripted = state
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone());

        Ok(scripted.unwrap_or_default())
    }

    fn run_interactive(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<i32> {
        let line = format!("{} {}", program, args.join(" "));
        let mut state = self.state.lock().unwrap();
        state.calls.push(line.clone());

        let status = state
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.status)
            .unwrap_or(0);
        Ok(status)
    }

    fn spawn_detached(
        &self,
        program: &str,
        args: &[&str],
        _cwd: &Path,
        _log_file: &Path,
    ) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("spawn {} {}", program, args.join(" ")));
        state.next_pid += 1;
        let pid = state.next_pid;
        state.alive.insert(pid);
        Ok(pid)
    }

    fn signal(&self, pid: u32, signal: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("kill -{} {}", signal, pid));
        match signal {
            "TERM" if state.term_ignored.contains(&pid) => {}
            "TERM" | "KILL" => {
                state.alive.remove(&pid);
            }
            _ => {}
        }
        Ok(())
    }
}

impl ProcessProbe for MockSystem {
    fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().unwrap().alive.contains(&pid)
    }
}
