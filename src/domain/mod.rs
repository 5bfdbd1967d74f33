pub mod env_file;
pub mod env_schema;
pub mod errors;
pub mod manifest;
pub mod ports;
pub mod process;
