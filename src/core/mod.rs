pub mod config;

pub use config::{AppConfig, ConfigError, load_credential};
