pub mod cli;
pub mod config;
pub mod plugin;

pub use cli::GuardCli;
pub use config::{create_runtime_config, create_runtime_config_in};
pub use importguard_core::{GuardConfig, GuardPlugin, NonInteractiveMode, OutputFormat, RuntimeConfig};
pub use plugin::PluginRegistry;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Settings error: {0}")]
    Settings(#[from] importguard_core::SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
