use crate::{create_runtime_config, PluginRegistry};
use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use importguard_core::{NonInteractiveMode, OutputFormat};
use std::path::PathBuf;

pub struct GuardCli {
    registry: PluginRegistry,
}

impl GuardCli {
    pub fn new() -> Self {
        let mut registry = PluginRegistry::new();
        registry.register_all_workspace_plugins();

        Self { registry }
    }

    pub fn build_app(&self) -> Command {
        let base_app = Command::new("importguard")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Keeps IDE import settings in line with the house style")
            .author("Importguard Contributors")
            .arg(
                Arg::new("settings")
                    .long("settings")
                    .short('s')
                    .value_name("PATH")
                    .help("Settings document to check (default: from .importguard)")
                    .global(true),
            )
            .arg(
                Arg::new("format")
                    .long("format")
                    .value_name("FORMAT")
                    .value_parser(["human", "json"])
                    .default_value("human")
                    .help("Output format")
                    .global(true),
            )
            .arg(
                Arg::new("non-interactive")
                    .long("non-interactive")
                    .value_name("MODE")
                    .value_parser(["fail", "defaults"])
                    .default_value("defaults")
                    .help("Behavior when a prompt is needed but no terminal is attached")
                    .global(true),
            )
            .arg(
                Arg::new("verbose")
                    .long("verbose")
                    .short('v')
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose output")
                    .global(true),
            )
            .arg(
                Arg::new("quiet")
                    .long("quiet")
                    .short('q')
                    .action(ArgAction::SetTrue)
                    .help("Suppress output")
                    .global(true)
                    .conflicts_with("verbose"),
            );

        self.registry.build_cli(base_app)
    }

    pub fn run(&self, args: Vec<String>) -> Result<()> {
        let app = self.build_app();
        let matches = app.try_get_matches_from(args)?;

        Self::init_logging(Self::log_directive(&matches));

        let format: OutputFormat = Self::flag(&matches, "format")?;
        let non_interactive: NonInteractiveMode = Self::flag(&matches, "non-interactive")?;
        let settings = matches.get_one::<String>("settings").map(PathBuf::from);

        match matches.subcommand() {
            Some((command_name, sub_matches)) => {
                let config = create_runtime_config(settings, format, non_interactive)?;
                self.registry.handle_command(command_name, sub_matches, &config)
            }
            None => {
                // No subcommand provided, show help
                let mut app = self.build_app();
                app.print_help()?;
                println!();
                Ok(())
            }
        }
    }

    fn flag<T>(matches: &ArgMatches, name: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = matches
            .get_one::<String>(name)
            .ok_or_else(|| anyhow!("--{} has no value", name))?;
        raw.parse::<T>().map_err(|e| anyhow!("--{}: {}", name, e))
    }

    fn log_directive(matches: &ArgMatches) -> &'static str {
        if matches.get_flag("verbose") {
            "importguard=debug"
        } else if matches.get_flag("quiet") {
            "importguard=error"
        } else {
            "importguard=info"
        }
    }

    fn init_logging(default_directive: &str) {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

        // a subscriber may already be installed when run more than once
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

impl Default for GuardCli {
    fn default() -> Self {
        Self::new()
    }
}
