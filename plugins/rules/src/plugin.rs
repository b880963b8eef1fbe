use crate::config::{load_style_or_default, save_style, HouseStyle};
use crate::engine::{ComplianceEngine, Remediation};
use crate::notify::{JsonNotifier, Notifier, TerminalNotifier};
use crate::triggers::{fix_file_imports, fix_now, startup_check, StartupOutcome};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use importguard_core::{
    ConfigurationSnapshot, FileSettingsHost, GuardConfig, GuardPlugin, OutputFormat, OutputFormatter, RuntimeConfig,
    SettingKey, TableOutput, CONFIG_FILE_NAME,
};
use serde_json::json;

pub struct RulesPlugin;

impl RulesPlugin {
    pub fn new() -> Self {
        Self
    }

    fn build_command(name: &'static str) -> Command {
        Command::new(name)
            .about("Check and fix IDE import settings against the house style")
            .allow_external_subcommands(true)
            .subcommand(
                Command::new("check")
                    .about("Report rules the current settings violate")
                    .arg(
                        Arg::new("fix")
                            .long("fix")
                            .help("Fix violations after reporting them")
                            .action(ArgAction::SetTrue),
                    ),
            )
            .subcommand(
                Command::new("fix").about("Apply the house style settings").arg(
                    Arg::new("silent")
                        .long("silent")
                        .help("Only report settings that could not be fixed")
                        .action(ArgAction::SetTrue),
                ),
            )
            .subcommand(Command::new("startup").about("Run the project-open check and offer a fix"))
            .subcommand(
                Command::new("fix-file")
                    .about("Fix settings, then organise imports of matching Java files")
                    .arg(
                        Arg::new("glob")
                            .value_name("GLOB")
                            .help("Files to organise, relative to the project root")
                            .required(true),
                    ),
            )
            .subcommand(
                Command::new("list").about("List rules and their status").arg(
                    Arg::new("settings-table")
                        .long("settings-table")
                        .help("List the settings the host exposes instead")
                        .action(ArgAction::SetTrue),
                ),
            )
            .subcommand(
                Command::new("init").about("Write a default house style file").arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Output file path (default: the configured style file)"),
                ),
            )
    }

    fn show_help(&self) -> Result<()> {
        Self::build_command("importguard style").print_help()?;
        println!();
        Ok(())
    }

    fn open_host(config: &RuntimeConfig) -> Result<FileSettingsHost> {
        let path = config.settings_path();
        if !path.exists() {
            return Err(anyhow!(
                "No settings document at {}. Pass --settings or set 'settings' in {}",
                path.display(),
                CONFIG_FILE_NAME
            ));
        }
        let host = FileSettingsHost::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        tracing::debug!(
            "Opened settings for {} from {}",
            host.host_label().unwrap_or("unknown host"),
            path.display()
        );
        Ok(host)
    }

    fn load_style(config: &RuntimeConfig) -> Result<HouseStyle> {
        let path = config.style_path();
        load_style_or_default(&path).with_context(|| format!("Invalid house style in {}", path.display()))
    }

    fn notifier(config: &RuntimeConfig, auto_fix: bool) -> Box<dyn Notifier> {
        match config.format {
            OutputFormat::Human => Box::new(TerminalNotifier::new(config.non_interactive)),
            OutputFormat::Json => Box::new(JsonNotifier::new(auto_fix)),
        }
    }

    fn handle_check(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        let fix = matches.get_flag("fix");
        let engine = ComplianceEngine::new(&Self::load_style(config)?);
        let mut host = Self::open_host(config)?;

        let violations = engine.violations(&ConfigurationSnapshot::capture(&host));

        match config.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "violations": violations }))?),
            OutputFormat::Human => {
                println!("\n{} {}", "Checking settings:".bold(), host.path().display().to_string().cyan());
                println!("{}", "=".repeat(50));
                if violations.is_empty() {
                    println!("✅ {}", "All rules passed!".green());
                }
                for violation in &violations {
                    println!("❌ {} {}", violation.rule.red().bold(), violation.message);
                }
            }
        }

        if violations.is_empty() {
            return Ok(());
        }

        let remaining = if fix {
            let notifier = Self::notifier(config, true);
            fix_now(&engine, &mut host, notifier.as_ref(), false)?.remaining.len()
        } else {
            if config.format == OutputFormat::Human {
                println!("\n💡 Run with --fix to apply the house style");
            }
            violations.len()
        };

        if remaining > 0 {
            return Err(anyhow!("{} import rule(s) violated", remaining));
        }
        Ok(())
    }

    fn handle_fix(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        let silent = matches.get_flag("silent");
        let engine = ComplianceEngine::new(&Self::load_style(config)?);
        let mut host = Self::open_host(config)?;

        let notifier = Self::notifier(config, true);
        let remediation = fix_now(&engine, &mut host, notifier.as_ref(), silent)?;
        Self::print_remediation(config, &remediation)
    }

    fn handle_startup(&self, config: &RuntimeConfig) -> Result<()> {
        let style = Self::load_style(config)?;
        let engine = ComplianceEngine::new(&style);
        let mut host = Self::open_host(config)?;

        let notifier = Self::notifier(config, false);
        let outcome = startup_check(&engine, &mut host, notifier.as_ref(), style.notify_on_startup)?;

        match config.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            OutputFormat::Human => match &outcome {
                StartupOutcome::Compliant => println!("✅ {}", "Import settings follow the house style".green()),
                StartupOutcome::Reported { violations } => {
                    println!("⚠️  {} rule(s) left as they are", violations.len().to_string().yellow())
                }
                StartupOutcome::Fixed { .. } => {}
            },
        }
        Ok(())
    }

    fn handle_fix_file(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        let pattern = matches
            .get_one::<String>("glob")
            .ok_or_else(|| anyhow!("GLOB is required"))?;
        let engine = ComplianceEngine::new(&Self::load_style(config)?);
        let mut host = Self::open_host(config)?;

        let notifier = Self::notifier(config, true);
        let root = config.project_root();
        let report = fix_file_imports(
            &engine,
            &mut host,
            notifier.as_ref(),
            &root,
            pattern,
            &config.guard_config,
        )?;

        match config.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Human => {
                for path in &report.organised {
                    let shown = path.strip_prefix(&root).unwrap_or(path);
                    println!("✅ {}", shown.display());
                }
                for error in &report.errors {
                    println!("❌ {}", error.reason.red());
                }
                println!(
                    "\n{} {} organised, {} unchanged, {} failed",
                    "Summary:".bold(),
                    report.organised.len(),
                    report.unchanged,
                    report.errors.len()
                );
            }
        }

        if report.errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} file(s) could not be organised", report.errors.len()))
        }
    }

    fn handle_list(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        let style = Self::load_style(config)?;
        let host = Self::open_host(config)?;
        let snapshot = ConfigurationSnapshot::capture(&host);

        let table = if matches.get_flag("settings-table") {
            let mut table = TableOutput::new(vec!["Setting".into(), "Host name".into(), "Value".into()]);
            for key in SettingKey::ALL.iter() {
                let name = key.resolve(&host).unwrap_or("-");
                let value = snapshot
                    .get(*key)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "unsupported".to_string());
                table.add_row(vec![key.name().to_string(), name.to_string(), value]);
            }
            table
        } else {
            let engine = ComplianceEngine::new(&style);
            let violated = engine.check_compliance(&snapshot);
            let mut table = TableOutput::new(vec!["Rule".into(), "Status".into(), "Message".into()]);
            for rule in engine.rules() {
                let status = if violated.contains(&rule.name()) { "violated" } else { "ok" };
                table.add_row(vec![rule.name().to_string(), status.to_string(), rule.message().to_string()]);
            }
            for skipped in &style.skip {
                table.add_row(vec![skipped.clone(), "skipped".to_string(), String::new()]);
            }
            table
        };

        println!("{}", table.format(config.format));
        Ok(())
    }

    fn handle_init(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        let full_path = match matches.get_one::<String>("output") {
            Some(output) => config.project_root().join(output),
            None => config.style_path(),
        };

        if full_path.exists() {
            println!(
                "{} House style already exists at: {}",
                "Warning:".yellow(),
                full_path.display()
            );
            return Ok(());
        }

        save_style(&full_path, &HouseStyle::default())?;
        println!("✅ Created house style at: {}", full_path.display());

        if !config.has_config_file() {
            let config_path = config.working_dir.join(CONFIG_FILE_NAME);
            GuardConfig::default().save_to_file(&config_path)?;
            println!("✅ Created {}", config_path.display());
        }

        Ok(())
    }

    fn print_remediation(config: &RuntimeConfig, remediation: &Remediation) -> Result<()> {
        match config.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(remediation)?),
            OutputFormat::Human => {
                for applied in &remediation.report.applied {
                    println!("   {} {} ({})", "→".green(), applied.name, applied.rule.dimmed());
                }
                for skipped in &remediation.report.skipped {
                    println!("   {} {} not available on this host", "-".dimmed(), skipped.key);
                }
            }
        }
        Ok(())
    }
}

impl GuardPlugin for RulesPlugin {
    fn name(&self) -> &str {
        "style"
    }

    fn register_commands(&self, app: Command) -> Command {
        app.subcommand(Self::build_command("style"))
    }

    fn handle_command(&self, matches: &ArgMatches, config: &RuntimeConfig) -> Result<()> {
        match matches.subcommand() {
            Some(("check", sub_matches)) => self.handle_check(sub_matches, config),
            Some(("fix", sub_matches)) => self.handle_fix(sub_matches, config),
            Some(("startup", _)) => self.handle_startup(config),
            Some(("fix-file", sub_matches)) => self.handle_fix_file(sub_matches, config),
            Some(("list", sub_matches)) => self.handle_list(sub_matches, config),
            Some(("init", sub_matches)) => self.handle_init(sub_matches, config),
            Some((external_cmd, _)) => {
                println!("Unknown style subcommand: '{}'", external_cmd);
                println!();
                self.show_help()
            }
            None => self.show_help(),
        }
    }
}

impl Default for RulesPlugin {
    fn default() -> Self {
        Self::new()
    }
}
