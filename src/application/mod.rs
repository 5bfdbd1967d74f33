pub mod doctor;
pub mod installer;
pub mod lifecycle;
pub mod service;
pub mod tasks;
pub mod uninstaller;
pub mod updater;
