//! Parameter configuration: the keys and values of a parameter's map.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::error::MessageParserError;
use crate::matcher::{CompareType, KeyTypes};
use crate::message::Message;
use crate::parser::lexer::{escape, unescape};
use crate::parser::MessageParser;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Bool(bool),
    Empty(CompareType),
    Name(String),
    Null(CompareType),
    /// Plain (`=`) or relational number key
    Number(CompareType, i64),
    String(CompareType, String),
}

impl ConfigKey {
    pub fn key_type(&self) -> KeyTypes {
        match self {
            ConfigKey::Bool(_) => KeyTypes::BOOL,
            ConfigKey::Empty(_) => KeyTypes::EMPTY,
            ConfigKey::Name(_) => KeyTypes::NAME,
            ConfigKey::Null(_) => KeyTypes::NULL,
            ConfigKey::Number(..) => KeyTypes::NUMBER,
            ConfigKey::String(..) => KeyTypes::STRING,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKey::Bool(b) => write!(f, "{b}"),
            ConfigKey::Empty(compare) => write!(f, "{}empty", compare.as_prefix()),
            ConfigKey::Name(name) => f.write_str(name),
            ConfigKey::Null(compare) => write!(f, "{}null", compare.as_prefix()),
            ConfigKey::Number(compare, n) => write!(f, "{}{}", compare.as_prefix(), n),
            ConfigKey::String(compare, s) => {
                write!(f, "{}{}", compare.as_prefix(), quote(&escape(s)))
            }
        }
    }
}

/// A quoted string value. The template source is kept so the value can be
/// parsed as a nested message the first time it is used as one.
#[derive(Debug, Clone)]
pub struct StringValue {
    source: Arc<str>,
    text: Arc<str>,
    message: OnceCell<Arc<Message>>,
}

impl StringValue {
    /// Value for a plain string.
    pub fn new(text: &str) -> Self {
        StringValue::from_parts(escape(text), text)
    }

    /// Value for template source with escape sequences.
    pub fn from_source(source: &str) -> Self {
        StringValue::from_parts(source, unescape(source))
    }

    pub(crate) fn from_parts(source: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        StringValue {
            source: source.into(),
            text: text.into(),
            message: OnceCell::new(),
        }
    }

    /// The string with escape sequences resolved
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The string as written in the template
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The value parsed as message; parsed once and cached.
    pub fn as_message(&self, parser: &MessageParser) -> Result<Arc<Message>, MessageParserError> {
        self.message
            .get_or_try_init(|| {
                tracing::trace!(source = %self.source, "parsing nested message");
                parser.parse(&self.source)
            })
            .map(Arc::clone)
    }

    pub fn is_parsed(&self) -> bool {
        self.message.get().is_some()
    }
}

impl PartialEq for StringValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for StringValue {}

impl Hash for StringValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigValue {
    Bool(bool),
    Message(Arc<Message>),
    Number(i64),
    String(StringValue),
}

impl ConfigValue {
    /// String representation for use as configuration text
    pub fn as_string(&self) -> Option<String> {
        match self {
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Number(n) => Some(n.to_string()),
            ConfigValue::String(s) => Some(s.as_str().to_string()),
            ConfigValue::Message(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            ConfigValue::String(s) => s.as_str().trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Number(n) => Some(*n != 0),
            ConfigValue::String(s) => match s.as_str().trim() {
                t if t.eq_ignore_ascii_case("true") => Some(true),
                t if t.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            ConfigValue::Message(_) => None,
        }
    }

    /// The value as message. Strings are parsed on first use.
    pub fn as_message(&self, parser: &MessageParser) -> Result<Arc<Message>, MessageParserError> {
        match self {
            ConfigValue::Message(message) => Ok(Arc::clone(message)),
            ConfigValue::String(s) => s.as_message(parser),
            ConfigValue::Bool(b) => Ok(Arc::new(Message::text(&b.to_string()))),
            ConfigValue::Number(n) => Ok(Arc::new(Message::text(&n.to_string()))),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(text: &str) -> Self {
        ConfigValue::String(StringValue::new(text))
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<Arc<Message>> for ConfigValue {
    fn from(message: Arc<Message>) -> Self {
        ConfigValue::Message(message)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::String(s) => f.write_str(&quote(s.source())),
            ConfigValue::Message(message) => f.write_str(&quote(&message.to_string())),
        }
    }
}

/// Wraps template source in quotes that do not clash with its content.
fn quote(source: &str) -> String {
    if !source.contains('\'') {
        format!("'{source}'")
    } else if !source.contains('"') {
        format!("\"{source}\"")
    } else {
        let mut quoted = String::with_capacity(source.len() + 4);
        let mut escaped = false;
        quoted.push('\'');
        for ch in source.chars() {
            if ch == '\'' && !escaped {
                quoted.push('\\');
            }
            escaped = ch == '\\' && !escaped;
            quoted.push(ch);
        }
        quoted.push('\'');
        quoted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate config element")]
pub struct DuplicateKey(pub Option<ConfigKey>);

/// Ordered key/value entries of a parameter plus an optional default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigMap {
    entries: Vec<(ConfigKey, ConfigValue)>,
    default: Option<ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        ConfigMap::default()
    }

    /// Adds an entry; keys must be unique within the map.
    pub fn insert(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), DuplicateKey> {
        if self.get(&key).is_some() {
            return Err(DuplicateKey(Some(key)));
        }
        self.entries.push((key, value));
        Ok(())
    }

    pub fn set_default(&mut self, value: ConfigValue) -> Result<(), DuplicateKey> {
        if self.default.is_some() {
            return Err(DuplicateKey(None));
        }
        self.default = Some(value);
        Ok(())
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }

    /// Value of the `name:value` entry
    pub fn config_value(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.iter().find_map(|(k, v)| match k {
            ConfigKey::Name(n) if n == name => Some(v),
            _ => None,
        })
    }

    pub fn default_value(&self) -> Option<&ConfigValue> {
        self.default.as_ref()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.default.is_none()
    }

    /// Union of the key types present
    pub fn key_types(&self) -> KeyTypes {
        self.entries
            .iter()
            .fold(KeyTypes::empty(), |types, (k, _)| types | k.key_type())
    }

    /// All values including the default
    pub fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.iter().map(|(_, v)| v).chain(self.default.iter())
    }
}

impl fmt::Display for ConfigMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.entries {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{key}:{value}")?;
        }
        if let Some(default) = &self.default {
            if !first {
                f.write_str(",")?;
            }
            write!(f, ":{default}")?;
        }
        Ok(())
    }
}
