use crate::config::HouseStyle;
use crate::validators::{default_rules, Rule};
use importguard_core::{ConfigurationSnapshot, SettingKey, SettingValue, SettingsError, SettingsHost, WriteScope};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedWrite {
    pub rule: &'static str,
    pub key: SettingKey,
    pub value: SettingValue,
}

/// Writes needed to fix a snapshot, at most one per key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixPlan {
    writes: Vec<PlannedWrite>,
}

impl FixPlan {
    /// Add a write unless an earlier rule already targets the key
    fn push(&mut self, rule: &'static str, key: SettingKey, value: SettingValue) {
        if self.writes.iter().any(|w| w.key == key) {
            tracing::debug!("{} already rewritten, {} shares the write", key, rule);
            return;
        }
        self.writes.push(PlannedWrite { rule, key, value });
    }

    pub fn writes(&self) -> &[PlannedWrite] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedWrite {
    pub rule: &'static str,
    pub key: SettingKey,
    /// Host name the value was written under
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedWrite {
    pub rule: &'static str,
    pub key: SettingKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedWrite {
    pub rule: &'static str,
    pub key: SettingKey,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixReport {
    pub applied: Vec<AppliedWrite>,
    /// Settings the host does not expose
    pub skipped: Vec<SkippedWrite>,
    /// Settings the host refused to change
    pub failed: Vec<FailedWrite>,
}

impl FixReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Result of a checked fix: what was wrong, what was written, what is still wrong
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Remediation {
    pub before: Vec<&'static str>,
    pub report: FixReport,
    pub remaining: Vec<&'static str>,
}

impl Remediation {
    pub fn is_closed(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn fixed(&self) -> Vec<&'static str> {
        self.before
            .iter()
            .copied()
            .filter(|rule| !self.remaining.contains(rule))
            .collect()
    }
}

/// Evaluates the house rules against snapshots and repairs hosts.
///
/// The engine keeps no state between calls; every check works on the
/// snapshot it is given.
pub struct ComplianceEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl ComplianceEngine {
    pub fn new(style: &HouseStyle) -> Self {
        Self::with_rules(default_rules(style))
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Names of violated rules, in rule order
    pub fn check_compliance(&self, snapshot: &ConfigurationSnapshot) -> Vec<&'static str> {
        self.violated_rules(snapshot).map(|rule| rule.name()).collect()
    }

    pub fn violations(&self, snapshot: &ConfigurationSnapshot) -> Vec<Violation> {
        self.violated_rules(snapshot)
            .map(|rule| Violation {
                rule: rule.name(),
                message: rule.message(),
            })
            .collect()
    }

    pub fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        self.violated_rules(snapshot).next().is_none()
    }

    fn violated_rules<'a>(&'a self, snapshot: &'a ConfigurationSnapshot) -> impl Iterator<Item = &'a dyn Rule> + 'a {
        self.rules().filter(move |rule| {
            let compliant = rule.is_compliant(snapshot);
            tracing::debug!("Rule {}: {}", rule.name(), if compliant { "ok" } else { "violated" });
            !compliant
        })
    }

    /// Writes for every violated rule. Rules targeting the same key (both
    /// layout rules) collapse into the first rule's write.
    pub fn plan_fix(&self, snapshot: &ConfigurationSnapshot) -> FixPlan {
        let mut plan = FixPlan::default();
        for rule in self.violated_rules(snapshot) {
            for (key, value) in rule.fix(snapshot) {
                plan.push(rule.name(), key, value);
            }
        }
        plan
    }

    /// Issue the planned writes. Unsupported settings are skipped and
    /// rejected writes recorded; neither stops the remaining writes.
    pub fn apply_fix(&self, snapshot: &ConfigurationSnapshot, scope: &mut WriteScope<'_>) -> FixReport {
        let mut report = FixReport::default();

        for write in self.plan_fix(snapshot).writes {
            match scope.write(write.key, write.value) {
                Ok(name) => report.applied.push(AppliedWrite {
                    rule: write.rule,
                    key: write.key,
                    name,
                }),
                Err(e) if e.is_unsupported() => {
                    tracing::debug!("Host has no {}, skipping fix for {}", write.key, write.rule);
                    report.skipped.push(SkippedWrite {
                        rule: write.rule,
                        key: write.key,
                    });
                }
                Err(e) => {
                    tracing::warn!("Could not write {} for {}: {}", write.key, write.rule, e);
                    report.failed.push(FailedWrite {
                        rule: write.rule,
                        key: write.key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Check, fix, commit, then check again against a fresh snapshot
    pub fn remediate(&self, host: &mut dyn SettingsHost) -> Result<Remediation, SettingsError> {
        let snapshot = ConfigurationSnapshot::capture(&*host);
        let before = self.check_compliance(&snapshot);
        if before.is_empty() {
            return Ok(Remediation::default());
        }

        let mut scope = WriteScope::begin(&mut *host);
        let report = self.apply_fix(&snapshot, &mut scope);
        scope.commit()?;

        let remaining = self.check_compliance(&ConfigurationSnapshot::capture(&*host));
        if remaining.is_empty() {
            tracing::info!("Fixed {} rule(s), {} setting(s) written", before.len(), report.applied.len());
        } else {
            tracing::warn!("Still violated after fixing: {}", remaining.join(", "));
        }

        Ok(Remediation {
            before,
            report,
            remaining,
        })
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(&HouseStyle::default())
    }
}
