use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Errors raised by settings hosts
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("setting '{0}' is not exposed by this host")]
    Unsupported(String),

    #[error("host rejected write to '{key}': {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("setting '{key}' holds {expected}, refusing to store {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported settings document format: {0}")]
    UnsupportedFormat(String),

    #[error("settings host lock was poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl SettingsError {
    /// True when the host simply does not know the setting
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SettingsError::Unsupported(_))
    }
}

/// Every setting the house style reads or writes.
///
/// A key has one canonical name plus the legacy names older hosts used for
/// the same setting. Hosts are probed in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    AddUnambiguousImportsOnTheFly,
    OptimizeImportsOnTheFly,
    AddImportsOnPaste,
    ShowImportPopup,
    ProjectOptimizeImportsOnTheFly,
    IndentDetection,
    WildcardClassThreshold,
    WildcardNamesThreshold,
    ImportLayoutOrder,
    WildcardPackages,
    ModuleImportGroup,
    DoNotSeparateModuleImports,
    DeleteUnusedModuleImports,
    UseSingleClassImports,
    InsertInnerClassImports,
    LayoutStaticImportsSeparately,
    UseFqClassNames,
    ClassNamesInJavadoc,
}

impl SettingKey {
    pub const ALL: [SettingKey; 18] = [
        SettingKey::AddUnambiguousImportsOnTheFly,
        SettingKey::OptimizeImportsOnTheFly,
        SettingKey::AddImportsOnPaste,
        SettingKey::ShowImportPopup,
        SettingKey::ProjectOptimizeImportsOnTheFly,
        SettingKey::IndentDetection,
        SettingKey::WildcardClassThreshold,
        SettingKey::WildcardNamesThreshold,
        SettingKey::ImportLayoutOrder,
        SettingKey::WildcardPackages,
        SettingKey::ModuleImportGroup,
        SettingKey::DoNotSeparateModuleImports,
        SettingKey::DeleteUnusedModuleImports,
        SettingKey::UseSingleClassImports,
        SettingKey::InsertInnerClassImports,
        SettingKey::LayoutStaticImportsSeparately,
        SettingKey::UseFqClassNames,
        SettingKey::ClassNamesInJavadoc,
    ];

    /// Canonical setting name
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::AddUnambiguousImportsOnTheFly => "auto_import_on_the_fly",
            SettingKey::OptimizeImportsOnTheFly => "optimize_imports_on_the_fly",
            SettingKey::AddImportsOnPaste => "add_imports_on_paste",
            SettingKey::ShowImportPopup => "show_import_popup",
            SettingKey::ProjectOptimizeImportsOnTheFly => "project_optimize_imports_on_the_fly",
            SettingKey::IndentDetection => "indent_detection_enabled",
            SettingKey::WildcardClassThreshold => "wildcard_class_threshold",
            SettingKey::WildcardNamesThreshold => "wildcard_names_threshold",
            SettingKey::ImportLayoutOrder => "import_layout_order",
            SettingKey::WildcardPackages => "wildcard_packages",
            SettingKey::ModuleImportGroup => "module_import_group",
            SettingKey::DoNotSeparateModuleImports => "do_not_separate_module_imports",
            SettingKey::DeleteUnusedModuleImports => "delete_unused_module_imports",
            SettingKey::UseSingleClassImports => "use_single_class_imports",
            SettingKey::InsertInnerClassImports => "insert_inner_class_imports",
            SettingKey::LayoutStaticImportsSeparately => "layout_static_imports_separately",
            SettingKey::UseFqClassNames => "use_fq_class_names",
            SettingKey::ClassNamesInJavadoc => "class_names_in_javadoc",
        }
    }

    /// Names used by older hosts, in probing order
    pub fn legacy_names(&self) -> &'static [&'static str] {
        match self {
            SettingKey::AddUnambiguousImportsOnTheFly => &[
                "add_unambiguous_imports_on_the_fly",
                // misspelled on some host releases
                "add_unambigious_imports_on_the_fly",
                "add_imports_on_the_fly",
            ],
            SettingKey::IndentDetection => &[
                "detect_indents",
                "enable_indent_detection",
                "indent_detection",
            ],
            SettingKey::WildcardClassThreshold => &["class_count_to_use_import_on_demand"],
            SettingKey::WildcardNamesThreshold => &["names_count_to_use_import_on_demand"],
            SettingKey::ImportLayoutOrder => &["import_layout_table"],
            SettingKey::WildcardPackages => &["packages_to_use_import_on_demand"],
            SettingKey::UseFqClassNames => &["use_fully_qualified_class_names"],
            _ => &[],
        }
    }

    /// Canonical name followed by the legacy names
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name()).chain(self.legacy_names().iter().copied())
    }

    /// Look a key up by canonical or legacy name
    pub fn from_name(name: &str) -> Option<SettingKey> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|key| key.names().any(|n| n == name))
    }

    /// First name of this key the host knows about
    pub fn resolve(&self, host: &dyn SettingsHost) -> Option<&'static str> {
        self.names().find(|name| host.has_setting(name))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SettingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SettingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        SettingKey::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown setting '{}'", name)))
    }
}

/// What the host does with imports when code is pasted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasteImports {
    Always,
    Ask,
    Never,
}

impl fmt::Display for PasteImports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasteImports::Always => write!(f, "always"),
            PasteImports::Ask => write!(f, "ask"),
            PasteImports::Never => write!(f, "never"),
        }
    }
}

/// One entry of an import layout table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutSegment {
    PackageGroup {
        prefix: String,
        #[serde(default)]
        static_import: bool,
        #[serde(default = "default_with_subpackages")]
        with_subpackages: bool,
    },
    BlankLine,
    AllOtherImports,
    AllOtherStaticImports,
    ModuleImports,
}

fn default_with_subpackages() -> bool {
    true
}

impl LayoutSegment {
    /// Non-static group covering `prefix` and its subpackages
    pub fn package(prefix: &str) -> Self {
        LayoutSegment::PackageGroup {
            prefix: prefix.to_string(),
            static_import: false,
            with_subpackages: true,
        }
    }

    pub fn static_package(prefix: &str) -> Self {
        LayoutSegment::PackageGroup {
            prefix: prefix.to_string(),
            static_import: true,
            with_subpackages: true,
        }
    }

    pub fn is_module_imports(&self) -> bool {
        matches!(self, LayoutSegment::ModuleImports)
    }

    /// True for `prefix.*`, non-static, with subpackages
    pub fn is_package_tree(&self, expected: &str) -> bool {
        matches!(
            self,
            LayoutSegment::PackageGroup { prefix, static_import: false, with_subpackages: true }
                if prefix == expected
        )
    }
}

impl fmt::Display for LayoutSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutSegment::PackageGroup { prefix, static_import, with_subpackages } => {
                if *static_import {
                    write!(f, "static ")?;
                }
                if *with_subpackages {
                    write!(f, "{}.**", prefix)
                } else {
                    write!(f, "{}.*", prefix)
                }
            }
            LayoutSegment::BlankLine => write!(f, "<blank line>"),
            LayoutSegment::AllOtherImports => write!(f, "<all other imports>"),
            LayoutSegment::AllOtherStaticImports => write!(f, "<all other static imports>"),
            LayoutSegment::ModuleImports => write!(f, "<module imports>"),
        }
    }
}

/// A single setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Paste(PasteImports),
    Layout(Vec<LayoutSegment>),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "a boolean",
            SettingValue::Int(_) => "an integer",
            SettingValue::Paste(_) => "a paste mode",
            SettingValue::Layout(_) => "a layout table",
        }
    }

    pub fn same_type(&self, other: &SettingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{}", value),
            SettingValue::Int(value) => write!(f, "{}", value),
            SettingValue::Paste(mode) => write!(f, "{}", mode),
            SettingValue::Layout(segments) => {
                let parts: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<PasteImports> for SettingValue {
    fn from(value: PasteImports) -> Self {
        SettingValue::Paste(value)
    }
}

impl From<Vec<LayoutSegment>> for SettingValue {
    fn from(value: Vec<LayoutSegment>) -> Self {
        SettingValue::Layout(value)
    }
}

/// Capability-discovery view of a host's settings.
///
/// The running host decides which names exist; everything in this crate and
/// the rules engine goes through these four calls.
pub trait SettingsHost {
    /// Whether the running host exposes `name`
    fn has_setting(&self, name: &str) -> bool;

    /// Current value of `name`, `None` when not exposed
    fn get_setting(&self, name: &str) -> Option<SettingValue>;

    /// Stage a write. Hosts reject unknown names with `Unsupported`.
    fn set_setting(&mut self, name: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Make staged writes durable and tell the host they changed
    fn commit(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }

    /// Every name the host exposes
    fn setting_names(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_start_with_canonical() {
        let names: Vec<_> = SettingKey::IndentDetection.names().collect();
        assert_eq!(
            names,
            vec![
                "indent_detection_enabled",
                "detect_indents",
                "enable_indent_detection",
                "indent_detection"
            ]
        );
    }

    #[test]
    fn test_from_name_accepts_legacy_names() {
        assert_eq!(
            SettingKey::from_name("add_unambigious_imports_on_the_fly"),
            Some(SettingKey::AddUnambiguousImportsOnTheFly)
        );
        assert_eq!(
            SettingKey::from_name("import_layout_table"),
            Some(SettingKey::ImportLayoutOrder)
        );
        assert_eq!(SettingKey::from_name("tab_size"), None);
    }

    #[test]
    fn test_canonical_names_are_unique() {
        let mut names: Vec<_> = SettingKey::ALL.iter().flat_map(|k| k.names()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_untagged_values_parse() {
        let values: Vec<SettingValue> = serde_json::from_str(
            r#"[true, 99, "always", [{"kind": "package_group", "prefix": "java"}, {"kind": "blank_line"}], []]"#,
        )
        .unwrap();

        assert_eq!(values[0], SettingValue::Bool(true));
        assert_eq!(values[1], SettingValue::Int(99));
        assert_eq!(values[2], SettingValue::Paste(PasteImports::Always));
        assert_eq!(
            values[3],
            SettingValue::Layout(vec![LayoutSegment::package("java"), LayoutSegment::BlankLine])
        );
        assert_eq!(values[4], SettingValue::Layout(Vec::new()));
    }

    #[test]
    fn test_package_tree_requires_non_static_with_subpackages() {
        assert!(LayoutSegment::package("java").is_package_tree("java"));
        assert!(!LayoutSegment::static_package("java").is_package_tree("java"));
        assert!(!LayoutSegment::package("javax").is_package_tree("java"));

        let flat = LayoutSegment::PackageGroup {
            prefix: "java".to_string(),
            static_import: false,
            with_subpackages: false,
        };
        assert!(!flat.is_package_tree("java"));
    }

    #[test]
    fn test_layout_display() {
        let value = SettingValue::Layout(vec![
            LayoutSegment::ModuleImports,
            LayoutSegment::package("java"),
            LayoutSegment::BlankLine,
        ]);
        assert_eq!(value.to_string(), "[<module imports>, java.**, <blank line>]");
    }

    #[test]
    fn test_setting_key_serializes_as_name() {
        let json = serde_json::to_string(&SettingKey::UseFqClassNames).unwrap();
        assert_eq!(json, "\"use_fq_class_names\"");
        let key: SettingKey = serde_json::from_str("\"use_fully_qualified_class_names\"").unwrap();
        assert_eq!(key, SettingKey::UseFqClassNames);
    }
}
