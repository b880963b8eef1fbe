pub mod config;
pub mod engine;
pub mod imports;
pub mod layout;
pub mod notify;
pub mod plugin;
pub mod triggers;
pub mod validators;

pub use config::{load_style, load_style_or_default, save_style, HouseStyle, DEFAULT_WILDCARD_THRESHOLD};
pub use engine::{ComplianceEngine, FixPlan, FixReport, PlannedWrite, Remediation, Violation};
pub use imports::{ImportOptimizer, LayoutImportOptimizer};
pub use notify::{JsonNotifier, Notification, NotificationKind, Notifier, RecordingNotifier, TerminalNotifier};
pub use plugin::RulesPlugin;
pub use triggers::{fix_file_imports, fix_now, startup_check, FileFixReport, StartupOutcome};
pub use validators::{default_rules, Rule};

