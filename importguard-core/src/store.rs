use crate::settings::{SettingValue, SettingsError, SettingsHost};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Settings kept in memory. Read-only names are visible but refuse writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    values: BTreeMap<String, SettingValue>,
    read_only: BTreeSet<String>,
    commits: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<SettingValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn read_only(mut self, name: &str) -> Self {
        self.read_only.insert(name.to_string());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<SettingValue> {
        self.values.remove(name)
    }

    /// Number of successful commits
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl SettingsHost for MemoryHost {
    fn has_setting(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn get_setting(&self, name: &str) -> Option<SettingValue> {
        self.values.get(name).cloned()
    }

    fn set_setting(&mut self, name: &str, value: SettingValue) -> Result<(), SettingsError> {
        store_value(&mut self.values, &self.read_only, name, value).map(|_| ())
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        self.commits += 1;
        Ok(())
    }

    fn setting_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Shared write rules for the in-memory and file hosts. Returns whether the
/// stored value changed.
fn store_value(
    values: &mut BTreeMap<String, SettingValue>,
    read_only: &BTreeSet<String>,
    name: &str,
    value: SettingValue,
) -> Result<bool, SettingsError> {
    let current = values
        .get_mut(name)
        .ok_or_else(|| SettingsError::Unsupported(name.to_string()))?;

    if read_only.contains(name) {
        return Err(SettingsError::WriteRejected {
            key: name.to_string(),
            reason: "setting is read-only on this host".to_string(),
        });
    }

    if !current.same_type(&value) {
        return Err(SettingsError::TypeMismatch {
            key: name.to_string(),
            expected: current.type_name(),
            found: value.type_name(),
        });
    }

    if *current == value {
        return Ok(false);
    }
    *current = value;
    Ok(true)
}

/// On-disk shape of a settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Free-form label of the host build the document came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub read_only: BTreeSet<String>,

    #[serde(default)]
    pub settings: BTreeMap<String, SettingValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            Some("toml") => Ok(DocumentFormat::Toml),
            _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse(&self, content: &str) -> Result<SettingsDocument, SettingsError> {
        Ok(match self {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Yaml => serde_yaml::from_str(content)?,
            DocumentFormat::Toml => toml::from_str(content)?,
        })
    }

    fn render(&self, document: &SettingsDocument) -> Result<String, SettingsError> {
        Ok(match self {
            DocumentFormat::Json => serde_json::to_string_pretty(document)?,
            DocumentFormat::Yaml => serde_yaml::to_string(document)?,
            DocumentFormat::Toml => toml::to_string_pretty(document)?,
        })
    }
}

/// A settings document on disk acting as the host.
///
/// The names present in the document are the host's capabilities; writes to
/// other names are unsupported. `commit` rewrites the file when a write
/// changed something.
#[derive(Debug)]
pub struct FileSettingsHost {
    path: PathBuf,
    format: DocumentFormat,
    document: SettingsDocument,
    dirty: bool,
}

impl FileSettingsHost {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let format = DocumentFormat::from_path(&path)?;
        let content = std::fs::read_to_string(&path)?;
        let document = format.parse(&content)?;

        tracing::debug!(
            "Loaded {} settings from {} (host: {})",
            document.settings.len(),
            path.display(),
            document.host.as_deref().unwrap_or("unknown")
        );

        Ok(Self {
            path,
            format,
            document,
            dirty: false,
        })
    }

    /// Write a fresh document to `path` and open it
    pub fn create<P: AsRef<Path>>(path: P, document: SettingsDocument) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let format = DocumentFormat::from_path(&path)?;
        std::fs::write(&path, format.render(&document)?)?;
        Ok(Self {
            path,
            format,
            document,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn host_label(&self) -> Option<&str> {
        self.document.host.as_deref()
    }

    pub fn document(&self) -> &SettingsDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl SettingsHost for FileSettingsHost {
    fn has_setting(&self, name: &str) -> bool {
        self.document.settings.contains_key(name)
    }

    fn get_setting(&self, name: &str) -> Option<SettingValue> {
        self.document.settings.get(name).cloned()
    }

    fn set_setting(&mut self, name: &str, value: SettingValue) -> Result<(), SettingsError> {
        let changed = store_value(
            &mut self.document.settings,
            &self.document.read_only,
            name,
            value,
        )?;
        self.dirty |= changed;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        std::fs::write(&self.path, self.format.render(&self.document)?)?;
        self.dirty = false;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn setting_names(&self) -> Vec<String> {
        self.document.settings.keys().cloned().collect()
    }
}
