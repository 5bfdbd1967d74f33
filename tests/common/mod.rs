use flowaictl::config::{Config, Supervisor};
use flowaictl::domain::manifest::{Backend, Manifest};
use flowaictl::infrastructure::manifest_store::ManifestStore;
use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Fresh config pointing at a unique scratch directory, background
/// supervision so no systemd is touched.
#[allow(dead_code)]
pub fn scratch_config(name: &str) -> Config {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let install_dir = std::env::temp_dir().join(format!(
        "flowaictl-test-{}-{}-{}",
        name,
        std::process::id(),
        n
    ));
    let _ = fs::remove_dir_all(&install_dir);

    Config {
        install_dir: install_dir.clone(),
        repo_url: "https://example.com/flowai-trading-bot.git".into(),
        repo_branch: "main".into(),
        service_name: "flowai-bot".into(),
        python_bin: "python3".into(),
        supervisor: Supervisor::Background,
        entrypoint: "main.py".into(),
        unit_dir: install_dir.join("units"),
        stop_timeout_secs: 1,
        log_tail_lines: 50,
    }
}

/// Simulates the side effects the real git/venv tools would have left behind:
/// the mock runner executes nothing, so tests lay down the artifacts.
#[allow(dead_code)]
pub fn fake_tool_effects(config: &Config) {
    fs::create_dir_all(config.install_dir.join(".git")).unwrap();
    fs::create_dir_all(config.venv_python().parent().unwrap()).unwrap();
    fs::write(config.venv_python(), "").unwrap();
}

/// Marks the tree installed the way a completed install would have.
#[allow(dead_code)]
pub fn fake_installed(config: &Config) {
    fake_tool_effects(config);
    fs::create_dir_all(config.install_dir.join("logs")).unwrap();
    let manifest = Manifest::new(
        config.repo_url.clone(),
        config.repo_branch.clone(),
        "Python 3.11.2".into(),
        Backend::Background,
    );
    ManifestStore::new(config.state_dir())
        .save(&manifest)
        .unwrap();
}

#[allow(dead_code)]
pub fn cleanup(config: &Config) {
    let _ = fs::remove_dir_all(&config.install_dir);
}

#[allow(dead_code)]
pub fn read_pid_file(config: &Config) -> Option<u32> {
    fs::read_to_string(config.pid_file())
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
