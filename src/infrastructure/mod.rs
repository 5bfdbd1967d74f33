pub mod command;
pub mod logs;
pub mod manifest_store;
pub mod mock;
pub mod pid_file;
pub mod systemd;
