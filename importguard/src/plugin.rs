use crate::{GuardError, RuntimeConfig};
use anyhow::Result;
use clap::{ArgMatches, Command};
use importguard_core::GuardPlugin;
use std::collections::HashMap;

pub struct PluginRegistry {
    plugins: HashMap<String, Box<dyn GuardPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn GuardPlugin>) {
        let name = plugin.name().to_string();
        tracing::debug!("Registered plugin {}", name);
        self.plugins.insert(name, plugin);
    }

    pub fn register_all_workspace_plugins(&mut self) {
        self.register(Box::new(importguard_rules::RulesPlugin::new()));
    }

    pub fn build_cli(&self, base_app: Command) -> Command {
        let mut names: Vec<&String> = self.plugins.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| self.plugins.get(name))
            .fold(base_app, |app, plugin| plugin.register_commands(app))
    }

    pub fn handle_command(&self, command_name: &str, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        if let Some(plugin) = self.plugins.get(command_name) {
            plugin.handle_command(matches, config)
        } else {
            Err(GuardError::Plugin(format!("Unknown command: {}", command_name)).into())
        }
    }

    pub fn get_plugin(&self, name: &str) -> Option<&dyn GuardPlugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn list_plugins(&self) -> Vec<&str> {
        self.plugins.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use importguard_core::{GuardConfig, NonInteractiveMode, OutputFormat};

    #[test]
    fn test_plugin_registry() {
        let registry = PluginRegistry::new();

        assert!(registry.get_plugin("style").is_none());
        assert!(registry.list_plugins().is_empty());
    }

    #[test]
    fn test_workspace_plugins() {
        let mut registry = PluginRegistry::new();
        registry.register_all_workspace_plugins();

        assert_eq!(registry.list_plugins(), vec!["style"]);
        let app = registry.build_cli(Command::new("importguard"));
        assert!(app.find_subcommand("style").is_some());
    }

    #[test]
    fn test_unknown_command() {
        let registry = PluginRegistry::new();
        let config = RuntimeConfig {
            guard_config: GuardConfig::default(),
            working_dir: std::env::temp_dir(),
            config_file_path: None,
            settings_override: None,
            format: OutputFormat::Human,
            non_interactive: NonInteractiveMode::Defaults,
        };
        let matches = Command::new("x").get_matches_from(vec!["x"]);

        let err = registry.handle_command("missing", &matches, &config).unwrap_err();
        assert!(err.to_string().contains("Unknown command: missing"));
    }
}
