//! Parameter sources

use indexmap::IndexMap;

use crate::locale::Locale;
use crate::value::Value;

/// Supplies the locale and the named values a message is formatted with.
pub trait Parameters: Send + Sync {
    fn locale(&self) -> &Locale;

    /// Value of the named parameter, `None` when the source has no such parameter
    fn parameter_value(&self, name: &str) -> Option<&Value>;

    fn parameter_names(&self) -> Vec<&str>;
}

/// Parameters kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    locale: Locale,
    values: IndexMap<String, Value>,
}

impl ParameterMap {
    pub fn new(locale: Locale) -> Self {
        ParameterMap {
            locale,
            values: IndexMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.to_string(), value.into())
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Parameters for ParameterMap {
    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn parameter_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn parameter_names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

/// No parameters at all.
#[derive(Debug, Clone, Default)]
pub struct NoParameters {
    locale: Locale,
}

impl NoParameters {
    pub fn new(locale: Locale) -> Self {
        NoParameters { locale }
    }
}

impl Parameters for NoParameters {
    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn parameter_value(&self, _name: &str) -> Option<&Value> {
        None
    }

    fn parameter_names(&self) -> Vec<&str> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_map() {
        let params = ParameterMap::new(Locale::parse("de").unwrap())
            .with("b", 2)
            .with("a", "x")
            .with("b", 3);

        assert_eq!(params.parameter_names(), vec!["b", "a"]);
        assert!(matches!(params.parameter_value("b"), Some(Value::I32(3))));
        assert!(params.parameter_value("c").is_none());
        assert_eq!(params.locale().language(), "de");
    }
}
