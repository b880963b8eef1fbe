use anyhow::Result;
use clap::{ArgMatches, Command};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod interactive;
pub mod output;
pub mod scope;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use interactive::{is_interactive, prompt_confirm, NonInteractiveMode};
pub use output::{OutputFormat, OutputFormatter, TableOutput};
pub use scope::{SharedHost, WriteScope};
pub use settings::{LayoutSegment, PasteImports, SettingKey, SettingValue, SettingsError, SettingsHost};
pub use snapshot::ConfigurationSnapshot;
pub use store::{DocumentFormat, FileSettingsHost, MemoryHost, SettingsDocument};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = ".importguard";

/// Trait that all importguard plugins must implement
pub trait GuardPlugin: Send + Sync {
    /// Returns the plugin name (used for command routing)
    fn name(&self) -> &str;

    /// Register CLI commands for this plugin
    fn register_commands(&self, app: Command) -> Command;

    /// Handle a command for this plugin
    fn handle_command(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()>;
}

/// Runtime configuration available to all plugins
#[derive(Debug)]
pub struct RuntimeConfig {
    pub guard_config: GuardConfig,
    pub working_dir: PathBuf,
    pub config_file_path: Option<PathBuf>,
    /// `--settings` given on the command line
    pub settings_override: Option<PathBuf>,
    pub format: OutputFormat,
    pub non_interactive: NonInteractiveMode,
}

impl RuntimeConfig {
    pub fn has_config_file(&self) -> bool {
        self.config_file_path.is_some()
    }

    /// Directory holding `.importguard`, or the working directory
    pub fn project_root(&self) -> PathBuf {
        self.config_file_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| self.working_dir.clone())
    }

    /// Settings document the host is read from
    pub fn settings_path(&self) -> PathBuf {
        match &self.settings_override {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.working_dir.join(path),
            None => self.project_root().join(&self.guard_config.settings),
        }
    }

    /// House style file
    pub fn style_path(&self) -> PathBuf {
        self.project_root().join(&self.guard_config.style)
    }
}

/// The .importguard file configuration format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_settings_file")]
    pub settings: String,
    #[serde(default = "default_style_file")]
    pub style: String,
    /// Directory names skipped when scanning source files
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_settings_file() -> String {
    "ide-settings.json".to_string()
}

fn default_style_file() -> String {
    ".house-style.yaml".to_string()
}

fn default_ignore() -> Vec<String> {
    vec![
        ".git".to_string(),
        ".idea".to_string(),
        "build".to_string(),
        "out".to_string(),
        "target".to_string(),
    ]
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            settings: default_settings_file(),
            style: default_style_file(),
            ignore: default_ignore(),
        }
    }
}

impl GuardConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GuardConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Walk up from `start` looking for a `.importguard` file
    pub fn find_config_file_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let config_file = current.join(CONFIG_FILE_NAME);
            if config_file.is_file() {
                return Some(config_file);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    pub fn find_config_file() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_config_file_from(&cwd)
    }

    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn runtime(root: &Path, config_file: Option<PathBuf>, settings_override: Option<PathBuf>) -> RuntimeConfig {
        RuntimeConfig {
            guard_config: GuardConfig::default(),
            working_dir: root.to_path_buf(),
            config_file_path: config_file,
            settings_override,
            format: OutputFormat::Human,
            non_interactive: NonInteractiveMode::Defaults,
        }
    }

    #[test]
    fn test_guard_config_default() {
        let config = GuardConfig::default();
        assert_eq!(config.settings, "ide-settings.json");
        assert_eq!(config.style, ".house-style.yaml");
        assert!(config.is_ignored(".git"));
        assert!(config.is_ignored("target"));
        assert!(!config.is_ignored("src"));
    }

    #[test]
    fn test_guard_config_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);

        let config = GuardConfig {
            settings: "config/idea.yaml".to_string(),
            ..GuardConfig::default()
        };
        config.save_to_file(&config_file).unwrap();

        let loaded = GuardConfig::load_from_file(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, r#"{ "settings": "idea.toml" }"#).unwrap();

        let loaded = GuardConfig::load_from_file(&config_file).unwrap();
        assert_eq!(loaded.settings, "idea.toml");
        assert_eq!(loaded.style, ".house-style.yaml");
        assert_eq!(loaded.ignore.len(), 5);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "{ invalid json }").unwrap();

        assert!(GuardConfig::load_from_file(&config_file).is_err());
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp_dir = tempdir().unwrap();
        let nested_dir = temp_dir.path().join("module").join("src");
        fs::create_dir_all(&nested_dir).unwrap();

        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        GuardConfig::default().save_to_file(&config_file).unwrap();

        let found = GuardConfig::find_config_file_from(&nested_dir).unwrap();
        assert_eq!(found.canonicalize().unwrap(), config_file.canonicalize().unwrap());
    }

    #[test]
    fn test_runtime_paths() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join("project").join(CONFIG_FILE_NAME);

        let with_file = runtime(temp_dir.path(), Some(config_file), None);
        assert!(with_file.has_config_file());
        assert_eq!(with_file.project_root(), temp_dir.path().join("project"));
        assert_eq!(
            with_file.settings_path(),
            temp_dir.path().join("project").join("ide-settings.json")
        );
        assert_eq!(
            with_file.style_path(),
            temp_dir.path().join("project").join(".house-style.yaml")
        );

        let overridden = runtime(temp_dir.path(), None, Some(PathBuf::from("other.yaml")));
        assert!(!overridden.has_config_file());
        assert_eq!(overridden.settings_path(), temp_dir.path().join("other.yaml"));
    }
}
