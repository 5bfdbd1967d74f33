use crate::config::{Config, Supervisor};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

fn clear_manager_vars() {
    for key in [
        "FLOWAI_INSTALL_DIR",
        "FLOWAI_REPO_URL",
        "FLOWAI_REPO_BRANCH",
        "FLOWAI_SERVICE_NAME",
        "FLOWAI_PYTHON_BIN",
        "FLOWAI_SUPERVISOR",
        "FLOWAI_ENTRYPOINT",
        "FLOWAI_UNIT_DIR",
        "FLOWAI_STOP_TIMEOUT_SECS",
        "FLOWAI_LOG_TAIL_LINES",
    ] {
        env::remove_var(key);
    }
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_manager_vars();
    env::set_var("HOME", "/home/flowai");

    let config = Config::from_env().unwrap();

    assert_eq!(config.install_dir, std::path::Path::new("/home/flowai/flowai-bot"));
    assert_eq!(config.repo_branch, "main");
    assert_eq!(config.service_name, "flowai-bot");
    assert_eq!(config.python_bin, "python3");
    assert_eq!(config.supervisor, Supervisor::Auto);
    assert_eq!(config.entrypoint, "main.py");
    assert_eq!(config.stop_timeout_secs, 10);
    assert_eq!(config.log_tail_lines, 50);
}

#[test]
fn test_config_derived_paths() {
    let _guard = get_env_lock().lock().unwrap();
    clear_manager_vars();
    env::set_var("FLOWAI_INSTALL_DIR", "/opt/flowai");
    env::set_var("FLOWAI_SERVICE_NAME", "flowai");

    let config = Config::from_env().unwrap();

    assert_eq!(config.venv_python(), std::path::Path::new("/opt/flowai/venv/bin/python"));
    assert_eq!(config.pid_file(), std::path::Path::new("/opt/flowai/.flowaictl/bot.pid"));
    assert_eq!(config.env_file(), std::path::Path::new("/opt/flowai/.env"));
    assert_eq!(config.log_file(), std::path::Path::new("/opt/flowai/logs/bot.log"));
    assert_eq!(
        config.unit_path(),
        std::path::Path::new("/etc/systemd/system/flowai.service")
    );

    clear_manager_vars();
}

#[test]
fn test_relative_install_dir_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_manager_vars();
    env::set_var("FLOWAI_INSTALL_DIR", "relative/path");

    let result = Config::from_env();

    assert!(result.is_err());
    let err_msg = format!("{:?}", result.err().unwrap());
    assert!(err_msg.contains("absolute"));

    clear_manager_vars();
}

#[test]
fn test_invalid_supervisor_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_manager_vars();
    env::set_var("FLOWAI_INSTALL_DIR", "/opt/flowai");
    env::set_var("FLOWAI_SUPERVISOR", "launchd");

    let result = Config::from_env();

    assert!(result.is_err());
    let err_msg = format!("{:?}", result.err().unwrap());
    assert!(err_msg.contains("FLOWAI_SUPERVISOR"));

    clear_manager_vars();
}

#[test]
fn test_zero_stop_timeout_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_manager_vars();
    env::set_var("FLOWAI_INSTALL_DIR", "/opt/flowai");
    env::set_var("FLOWAI_STOP_TIMEOUT_SECS", "0");

    let result = Config::from_env();

    assert!(result.is_err());

    clear_manager_vars();
}
