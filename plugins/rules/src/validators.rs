use crate::config::HouseStyle;
use crate::layout::{canonical_layout, module_imports_lead, starts_with_java_then_javax};
use importguard_core::{ConfigurationSnapshot, PasteImports, SettingKey, SettingValue};

/// Rule names, in evaluation order
pub mod names {
    pub const AUTO_IMPORT_ENABLED: &str = "auto_import_enabled";
    pub const PROJECT_AUTO_IMPORT_ENABLED: &str = "project_auto_import_enabled";
    pub const INDENT_DETECTION_DISABLED: &str = "indent_detection_disabled";
    pub const NO_WILDCARD_IMPORTS: &str = "no_wildcard_imports";
    pub const IMPORT_LAYOUT_ORDER: &str = "import_layout_order";
    pub const MODULE_IMPORTS_FIRST: &str = "module_imports_first";
    pub const USE_SINGLE_CLASS_IMPORTS: &str = "use_single_class_imports";
    pub const INSERT_INNER_CLASS_IMPORTS: &str = "insert_inner_class_imports";
    pub const LAYOUT_STATIC_IMPORTS_SEPARATELY: &str = "layout_static_imports_separately";
    pub const NO_PACKAGE_WILDCARD_EXCEPTIONS: &str = "no_package_wildcard_exceptions";
    pub const NO_FULLY_QUALIFIED_CLASS_NAMES: &str = "no_fully_qualified_class_names";
}

/// `class_names_in_javadoc` value meaning "fully qualify only when not imported"
pub const JAVADOC_QUALIFY_IF_NOT_IMPORTED: i64 = 2;

/// A setting the fix wants written
pub type Write = (SettingKey, SettingValue);

/// One house style rule.
///
/// `is_compliant` must be pure. Settings missing from the snapshot count as
/// compliant so that hosts without them never see a violation.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Human-readable text shown when the rule is violated
    fn message(&self) -> &'static str;

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool;

    /// Writes that bring the snapshot into compliance
    fn fix(&self, snapshot: &ConfigurationSnapshot) -> Vec<Write>;
}

/// Auto import on the fly, optimize on the fly and imports on paste
pub struct AutoImportRule;

impl Rule for AutoImportRule {
    fn name(&self) -> &'static str {
        names::AUTO_IMPORT_ENABLED
    }

    fn message(&self) -> &'static str {
        "Auto import on the fly, optimize imports on the fly and add imports on paste (always) must be enabled"
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        let add = snapshot.bool(SettingKey::AddUnambiguousImportsOnTheFly).unwrap_or(true);
        let optimize = snapshot.bool(SettingKey::OptimizeImportsOnTheFly).unwrap_or(true);
        let paste = snapshot
            .paste(SettingKey::AddImportsOnPaste)
            .map_or(true, |mode| mode == PasteImports::Always);

        add && optimize && paste
    }

    fn fix(&self, _snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        vec![
            (SettingKey::AddUnambiguousImportsOnTheFly, true.into()),
            (SettingKey::OptimizeImportsOnTheFly, true.into()),
            (SettingKey::AddImportsOnPaste, PasteImports::Always.into()),
            (SettingKey::ShowImportPopup, true.into()),
        ]
    }
}

/// A single boolean that must hold a fixed value
pub struct FlagRule {
    name: &'static str,
    message: &'static str,
    key: SettingKey,
    expected: bool,
    companions: Vec<Write>,
}

impl FlagRule {
    pub fn new(name: &'static str, message: &'static str, key: SettingKey, expected: bool) -> Self {
        Self {
            name,
            message,
            key,
            expected,
            companions: Vec::new(),
        }
    }

    /// Extra setting written along with the fix, never checked
    pub fn with_companion(mut self, key: SettingKey, value: impl Into<SettingValue>) -> Self {
        self.companions.push((key, value.into()));
        self
    }
}

impl Rule for FlagRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn message(&self) -> &'static str {
        self.message
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        snapshot.bool(self.key).map_or(true, |value| value == self.expected)
    }

    fn fix(&self, _snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        let mut writes = vec![(self.key, SettingValue::Bool(self.expected))];
        writes.extend(self.companions.iter().cloned());
        writes
    }
}

/// Both on-demand thresholds at or above the house minimum
pub struct WildcardThresholdRule {
    minimum: i64,
}

impl WildcardThresholdRule {
    const KEYS: [SettingKey; 2] = [SettingKey::WildcardClassThreshold, SettingKey::WildcardNamesThreshold];

    pub fn new(minimum: i64) -> Self {
        Self { minimum }
    }
}

impl Rule for WildcardThresholdRule {
    fn name(&self) -> &'static str {
        names::NO_WILDCARD_IMPORTS
    }

    fn message(&self) -> &'static str {
        "Wildcard imports must be disabled (class and name count thresholds too low)"
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        Self::KEYS
            .iter()
            .all(|key| snapshot.int(*key).map_or(true, |n| n >= self.minimum))
    }

    fn fix(&self, snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        // raise only; a stricter value already in place stays
        Self::KEYS
            .iter()
            .filter(|key| snapshot.int(**key).map_or(false, |n| n < self.minimum))
            .map(|key| (*key, SettingValue::Int(self.minimum)))
            .collect()
    }
}

fn canonical_layout_write(snapshot: &ConfigurationSnapshot) -> Write {
    (
        SettingKey::ImportLayoutOrder,
        SettingValue::Layout(canonical_layout(snapshot.supports_module_imports())),
    )
}

pub struct ImportLayoutOrderRule;

impl Rule for ImportLayoutOrderRule {
    fn name(&self) -> &'static str {
        names::IMPORT_LAYOUT_ORDER
    }

    fn message(&self) -> &'static str {
        "Import layout must start with java.*, then javax.*, then all other imports, a blank line and static imports"
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        snapshot
            .layout(SettingKey::ImportLayoutOrder)
            .map_or(true, starts_with_java_then_javax)
    }

    fn fix(&self, snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        vec![canonical_layout_write(snapshot)]
    }
}

pub struct ModuleImportsFirstRule;

impl Rule for ModuleImportsFirstRule {
    fn name(&self) -> &'static str {
        names::MODULE_IMPORTS_FIRST
    }

    fn message(&self) -> &'static str {
        "Module imports must come first in the import layout"
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        if !snapshot.supports_module_imports() {
            return true;
        }
        snapshot
            .layout(SettingKey::ImportLayoutOrder)
            .map_or(true, module_imports_lead)
    }

    fn fix(&self, snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        vec![
            canonical_layout_write(snapshot),
            (SettingKey::DoNotSeparateModuleImports, true.into()),
            (SettingKey::DeleteUnusedModuleImports, false.into()),
        ]
    }
}

/// No package may be exempted into wildcard imports
pub struct WildcardPackagesRule;

impl Rule for WildcardPackagesRule {
    fn name(&self) -> &'static str {
        names::NO_PACKAGE_WILDCARD_EXCEPTIONS
    }

    fn message(&self) -> &'static str {
        "Packages to use import with '*' must be empty"
    }

    fn is_compliant(&self, snapshot: &ConfigurationSnapshot) -> bool {
        snapshot
            .layout(SettingKey::WildcardPackages)
            .map_or(true, |packages| packages.is_empty())
    }

    fn fix(&self, _snapshot: &ConfigurationSnapshot) -> Vec<Write> {
        vec![(SettingKey::WildcardPackages, SettingValue::Layout(Vec::new()))]
    }
}

/// The house rule set in evaluation order, minus skipped rules
pub fn default_rules(style: &HouseStyle) -> Vec<Box<dyn Rule>> {
    let rules: Vec<Box<dyn Rule>> = vec![
        Box::new(AutoImportRule),
        Box::new(FlagRule::new(
            names::PROJECT_AUTO_IMPORT_ENABLED,
            "Optimize imports on the fly must be enabled for the project",
            SettingKey::ProjectOptimizeImportsOnTheFly,
            true,
        )),
        Box::new(FlagRule::new(
            names::INDENT_DETECTION_DISABLED,
            "Indent detection must be disabled",
            SettingKey::IndentDetection,
            false,
        )),
        Box::new(WildcardThresholdRule::new(style.wildcard_threshold)),
        Box::new(ImportLayoutOrderRule),
        Box::new(ModuleImportsFirstRule),
        Box::new(FlagRule::new(
            names::USE_SINGLE_CLASS_IMPORTS,
            "Use single class imports must be enabled",
            SettingKey::UseSingleClassImports,
            true,
        )),
        Box::new(FlagRule::new(
            names::INSERT_INNER_CLASS_IMPORTS,
            "Insert imports for inner classes must be enabled",
            SettingKey::InsertInnerClassImports,
            true,
        )),
        Box::new(FlagRule::new(
            names::LAYOUT_STATIC_IMPORTS_SEPARATELY,
            "Layout static imports separately must be enabled",
            SettingKey::LayoutStaticImportsSeparately,
            true,
        )),
        Box::new(WildcardPackagesRule),
        Box::new(
            FlagRule::new(
                names::NO_FULLY_QUALIFIED_CLASS_NAMES,
                "Use fully qualified class names must be disabled",
                SettingKey::UseFqClassNames,
                false,
            )
            .with_companion(SettingKey::ClassNamesInJavadoc, JAVADOC_QUALIFY_IF_NOT_IMPORTED),
        ),
    ];

    rules
        .into_iter()
        .filter(|rule| {
            let skipped = style.is_skipped(rule.name());
            if skipped {
                tracing::debug!("Skipping rule {}", rule.name());
            }
            !skipped
        })
        .collect()
}
