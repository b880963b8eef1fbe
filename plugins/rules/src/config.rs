use anyhow::{anyhow, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum class/name count before the IDE may collapse imports into `*`
pub const DEFAULT_WILDCARD_THRESHOLD: i64 = 99;

/// House style tuning, read from `.house-style.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseStyle {
    #[serde(default = "default_wildcard_threshold")]
    pub wildcard_threshold: i64,

    /// Glob patterns of rule names that are not evaluated
    #[serde(default)]
    pub skip: Vec<String>,

    #[serde(default = "default_notify_on_startup")]
    pub notify_on_startup: bool,
}

fn default_wildcard_threshold() -> i64 {
    DEFAULT_WILDCARD_THRESHOLD
}

fn default_notify_on_startup() -> bool {
    true
}

impl Default for HouseStyle {
    fn default() -> Self {
        Self {
            wildcard_threshold: DEFAULT_WILDCARD_THRESHOLD,
            skip: Vec::new(),
            notify_on_startup: true,
        }
    }
}

impl HouseStyle {
    pub fn validate(&self) -> Result<()> {
        if self.wildcard_threshold < 1 {
            return Err(anyhow!(
                "wildcard_threshold must be at least 1, got {}",
                self.wildcard_threshold
            ));
        }
        for pattern in &self.skip {
            Pattern::new(pattern).map_err(|e| anyhow!("invalid skip pattern '{}': {}", pattern, e))?;
        }
        Ok(())
    }

    pub fn is_skipped(&self, rule_name: &str) -> bool {
        self.skip
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(rule_name))
    }
}

pub fn load_style<P: AsRef<Path>>(path: P) -> Result<HouseStyle> {
    let content = std::fs::read_to_string(path)?;

    // Try to parse as YAML first, then JSON
    let style = if let Ok(style) = serde_yaml::from_str::<HouseStyle>(&content) {
        style
    } else if let Ok(style) = serde_json::from_str::<HouseStyle>(&content) {
        style
    } else {
        return Err(anyhow!("Failed to parse house style as YAML or JSON"));
    };

    style.validate()?;
    Ok(style)
}

/// Load `path` if it exists, otherwise the built-in house style
pub fn load_style_or_default<P: AsRef<Path>>(path: P) -> Result<HouseStyle> {
    let path = path.as_ref();
    if path.exists() {
        tracing::debug!("Using house style from {}", path.display());
        load_style(path)
    } else {
        tracing::debug!("No house style at {}, using defaults", path.display());
        Ok(HouseStyle::default())
    }
}

pub fn save_style<P: AsRef<Path>>(path: P, style: &HouseStyle) -> Result<()> {
    let yaml = serde_yaml::to_string(style)?;
    std::fs::write(path, yaml)?;
    Ok(())
}
