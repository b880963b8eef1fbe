use crate::engine::{ComplianceEngine, Remediation};
use crate::imports::{matching_java_files, organize_file, LayoutImportOptimizer};
use crate::notify::{Notification, Notifier, FIX_NOW};
use anyhow::Result;
use importguard_core::{ConfigurationSnapshot, GuardConfig, SettingsHost};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartupOutcome {
    Compliant,
    /// Violations found and left alone
    Reported { violations: Vec<&'static str> },
    Fixed { remediation: Remediation },
}

/// Check once; when violated, offer "Fix now" and run it if accepted
pub fn startup_check(
    engine: &ComplianceEngine,
    host: &mut dyn SettingsHost,
    notifier: &dyn Notifier,
    notify: bool,
) -> Result<StartupOutcome> {
    let violations = engine.violations(&ConfigurationSnapshot::capture(&*host));
    if violations.is_empty() {
        tracing::debug!("Import settings are compliant");
        return Ok(StartupOutcome::Compliant);
    }

    let names: Vec<&'static str> = violations.iter().map(|v| v.rule).collect();
    tracing::warn!("Non-compliant rules at startup: {}", names.join("; "));

    if !notify {
        return Ok(StartupOutcome::Reported { violations: names });
    }

    let notification = Notification::warning("Import settings do not follow the house style")
        .with_lines(violations.iter().map(|v| format!("{} - {}", v.rule, v.message)))
        .with_action(FIX_NOW);

    if notifier.notify(&notification)? {
        let remediation = fix_now(engine, host, notifier, false)?;
        Ok(StartupOutcome::Fixed { remediation })
    } else {
        Ok(StartupOutcome::Reported { violations: names })
    }
}

/// Remediate and tell the user. `silent` drops the success message only;
/// rules still violated and writes that failed are always reported.
pub fn fix_now(
    engine: &ComplianceEngine,
    host: &mut dyn SettingsHost,
    notifier: &dyn Notifier,
    silent: bool,
) -> Result<Remediation> {
    let remediation = engine.remediate(host)?;
    let failed: Vec<String> = remediation
        .report
        .failed
        .iter()
        .map(|f| format!("{} could not be written: {}", f.key, f.reason))
        .collect();

    if !remediation.is_closed() {
        let mut lines: Vec<String> = remediation.remaining.iter().map(|r| r.to_string()).collect();
        lines.extend(failed);
        notifier.notify(&Notification::warning("Some import settings are still not compliant").with_lines(lines))?;
    } else if !silent || !failed.is_empty() {
        let notification = if remediation.before.is_empty() {
            Notification::information("Import settings already follow the house style")
        } else {
            Notification::information("Import settings updated").with_line(format!(
                "Applied {} setting(s) for: {}",
                remediation.report.applied.len(),
                remediation.before.join(", ")
            ))
        };
        notifier.notify(&notification.with_lines(failed))?;
    }

    Ok(remediation)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileFixReport {
    pub remediation: Remediation,
    pub organised: Vec<PathBuf>,
    pub unchanged: usize,
    pub errors: Vec<FileError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub reason: String,
}

/// Silently fix the settings, then organise the imports of every Java file
/// under `root` matching `pattern` with the fixed layout
pub fn fix_file_imports(
    engine: &ComplianceEngine,
    host: &mut dyn SettingsHost,
    notifier: &dyn Notifier,
    root: &Path,
    pattern: &str,
    config: &GuardConfig,
) -> Result<FileFixReport> {
    let remediation = fix_now(engine, host, notifier, true)?;
    let optimizer = LayoutImportOptimizer::from_snapshot(&ConfigurationSnapshot::capture(&*host))?;

    let mut report = FileFixReport {
        remediation,
        ..FileFixReport::default()
    };

    for path in matching_java_files(root, pattern, config)? {
        match organize_file(&optimizer, &path) {
            Ok(true) => report.organised.push(path),
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                tracing::warn!("Left imports untouched: {}", e);
                report.errors.push(FileError {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Organised imports in {} file(s), {} already in order",
        report.organised.len(),
        report.unchanged
    );
    Ok(report)
}
