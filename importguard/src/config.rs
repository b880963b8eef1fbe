use crate::GuardError;
use anyhow::Result;
use importguard_core::{GuardConfig, NonInteractiveMode, OutputFormat, RuntimeConfig};
use std::path::{Path, PathBuf};

pub fn create_runtime_config(
    settings_override: Option<PathBuf>,
    format: OutputFormat,
    non_interactive: NonInteractiveMode,
) -> Result<RuntimeConfig> {
    let working_dir = std::env::current_dir()?;
    create_runtime_config_in(&working_dir, settings_override, format, non_interactive)
}

/// Runtime configuration for a working directory, loading the nearest
/// `.importguard` above it
pub fn create_runtime_config_in(
    working_dir: &Path,
    settings_override: Option<PathBuf>,
    format: OutputFormat,
    non_interactive: NonInteractiveMode,
) -> Result<RuntimeConfig> {
    let config_file_path = GuardConfig::find_config_file_from(working_dir);

    let guard_config = match &config_file_path {
        Some(path) => {
            tracing::debug!("Using {}", path.display());
            GuardConfig::load_from_file(path)
                .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))?
        }
        None => GuardConfig::default(),
    };

    Ok(RuntimeConfig {
        guard_config,
        working_dir: working_dir.to_path_buf(),
        config_file_path,
        settings_override,
        format,
        non_interactive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use importguard_core::CONFIG_FILE_NAME;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempdir().unwrap();
        let config = create_runtime_config_in(dir.path(), None, OutputFormat::Human, NonInteractiveMode::Defaults)
            .unwrap();

        assert!(!config.has_config_file());
        assert_eq!(config.guard_config, GuardConfig::default());
        assert_eq!(config.settings_path(), dir.path().join("ide-settings.json"));
    }

    #[test]
    fn test_config_file_found_from_subdirectory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("app").join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "settings": "idea/settings.yaml" }"#).unwrap();

        let config =
            create_runtime_config_in(&nested, None, OutputFormat::Human, NonInteractiveMode::Defaults).unwrap();

        assert!(config.has_config_file());
        assert_eq!(config.guard_config.settings, "idea/settings.yaml");
        assert_eq!(
            config.settings_path().canonicalize().ok(),
            dir.path().join("idea/settings.yaml").canonicalize().ok()
        );
    }

    #[test]
    fn test_broken_config_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = create_runtime_config_in(dir.path(), None, OutputFormat::Human, NonInteractiveMode::Defaults)
            .unwrap_err();
        assert!(err.downcast_ref::<GuardError>().is_some());
    }

    #[test]
    fn test_settings_override_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").unwrap();

        let config = create_runtime_config_in(
            dir.path(),
            Some(PathBuf::from("custom.toml")),
            OutputFormat::Human,
            NonInteractiveMode::Defaults,
        )
        .unwrap();
        assert_eq!(config.settings_path(), dir.path().join("custom.toml"));
    }
}
