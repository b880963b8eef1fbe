use crate::settings::{LayoutSegment, PasteImports, SettingKey, SettingValue, SettingsHost};
use serde::Serialize;
use std::collections::BTreeMap;

/// Read view of the settings a host exposed at capture time.
///
/// A key is absent when the host knows none of its names. Typed accessors
/// return `None` for absent keys and for values of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationSnapshot {
    values: BTreeMap<SettingKey, SettingValue>,
}

impl ConfigurationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every known key from the host
    pub fn capture(host: &dyn SettingsHost) -> Self {
        let mut values = BTreeMap::new();

        for key in SettingKey::ALL {
            let Some(name) = key.resolve(host) else {
                continue;
            };
            if let Some(value) = host.get_setting(name) {
                values.insert(key, value);
            }
        }

        tracing::debug!("Captured {} of {} settings", values.len(), SettingKey::ALL.len());
        Self { values }
    }

    pub fn with(mut self, key: SettingKey, value: impl Into<SettingValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: SettingKey, value: impl Into<SettingValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: SettingKey) -> Option<&SettingValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: SettingKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bool(&self, key: SettingKey) -> Option<bool> {
        match self.values.get(&key)? {
            SettingValue::Bool(value) => Some(*value),
            other => self.mistyped(key, other),
        }
    }

    pub fn int(&self, key: SettingKey) -> Option<i64> {
        match self.values.get(&key)? {
            SettingValue::Int(value) => Some(*value),
            other => self.mistyped(key, other),
        }
    }

    pub fn paste(&self, key: SettingKey) -> Option<PasteImports> {
        match self.values.get(&key)? {
            SettingValue::Paste(mode) => Some(*mode),
            other => self.mistyped(key, other),
        }
    }

    pub fn layout(&self, key: SettingKey) -> Option<&[LayoutSegment]> {
        match self.values.get(&key)? {
            SettingValue::Layout(segments) => Some(segments.as_slice()),
            other => self.mistyped(key, other),
        }
    }

    /// The host offers a module-imports layout group
    pub fn supports_module_imports(&self) -> bool {
        self.bool(SettingKey::ModuleImportGroup).unwrap_or(false)
    }

    fn mistyped<T>(&self, key: SettingKey, value: &SettingValue) -> Option<T> {
        tracing::debug!("Ignoring {} for '{}': unexpected type", value.type_name(), key);
        None
    }
}
