//! Engine configuration, read from JSON.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::locale::Locale;
use crate::message::{ConfigKey, ConfigMap, ConfigValue};
use crate::normalizer::{
    LruNormalizer, MessagePartNormalizer, NoOpNormalizer, UnboundedNormalizer,
};

pub const DEFAULT_NORMALIZER_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizerKind {
    None,
    Unbounded,
    #[default]
    Lru,
}

/// Value of a parameter configuration default, e.g. `"list-sep": " | "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl From<&DefaultValue> for ConfigValue {
    fn from(value: &DefaultValue) -> Self {
        match value {
            DefaultValue::Bool(b) => ConfigValue::Bool(*b),
            DefaultValue::Number(n) => ConfigValue::Number(*n),
            DefaultValue::String(s) => ConfigValue::from(s.as_str()),
        }
    }
}

/// Message engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MessageConfig {
    pub normalizer: NormalizerKind,
    pub normalizer_capacity: usize,
    /// Absent parameters fail formatting instead of formatting as null
    pub strict_parameters: bool,
    /// Locale used when the parameters carry the root locale
    pub default_locale: Option<Locale>,
    pub compress_packs: bool,
    /// Parameter configuration used when a parameter's own map has no such entry
    pub defaults: IndexMap<String, DefaultValue>,
}

impl Default for MessageConfig {
    fn default() -> Self {
        MessageConfig {
            normalizer: NormalizerKind::Lru,
            normalizer_capacity: DEFAULT_NORMALIZER_CAPACITY,
            strict_parameters: false,
            default_locale: None,
            compress_packs: false,
            defaults: IndexMap::new(),
        }
    }
}

impl MessageConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MessageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        MessageConfig::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.normalizer == NormalizerKind::Lru && self.normalizer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn create_normalizer(&self) -> Result<Arc<dyn MessagePartNormalizer>, ConfigError> {
        Ok(match self.normalizer {
            NormalizerKind::None => Arc::new(NoOpNormalizer),
            NormalizerKind::Unbounded => Arc::new(UnboundedNormalizer::new()),
            NormalizerKind::Lru => Arc::new(LruNormalizer::new(self.normalizer_capacity)?),
        })
    }

    /// The configured defaults as name entries of a config map
    pub fn default_config_map(&self) -> ConfigMap {
        let mut map = ConfigMap::new();
        for (name, value) in &self.defaults {
            // names are unique in the source map
            let _ = map.insert(ConfigKey::Name(name.clone()), value.into());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MessageConfig::default();
        assert_eq!(config.normalizer, NormalizerKind::Lru);
        assert_eq!(config.normalizer_capacity, 256);
        assert!(config.validate().is_ok());
        assert_eq!(MessageConfig::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_from_json() {
        let config = MessageConfig::from_json_str(
            r#"{
                "normalizer": "unbounded",
                "strict-parameters": true,
                "default-locale": "de-DE",
                "defaults": { "list-sep": " | ", "clip-size": 16, "flag": true }
            }"#,
        )
        .unwrap();

        assert_eq!(config.normalizer, NormalizerKind::Unbounded);
        assert!(config.strict_parameters);
        assert_eq!(config.default_locale, Some(Locale::parse("de-DE").unwrap()));

        let map = config.default_config_map();
        assert_eq!(map.config_value("list-sep"), Some(&ConfigValue::from(" | ")));
        assert_eq!(map.config_value("clip-size"), Some(&ConfigValue::Number(16)));
        assert_eq!(map.config_value("flag"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            MessageConfig::from_json_str(r#"{"normalizer-capacity": 0}"#),
            Err(ConfigError::ZeroCapacity)
        ));
        assert!(matches!(
            MessageConfig::from_json_str(r#"{"normalizer": "fifo"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            MessageConfig::from_json_str(r#"{"default-locale": "not a locale"}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
