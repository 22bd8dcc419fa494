#![deny(clippy::all)]

/**
 * Message Format
 *
 * Parameterized, localizable message templates: parsing, formatting with
 * pluggable formatters, node sharing and a compact binary pack format.
 */

// Text primitives
pub mod chars;
pub mod collation;
pub mod locale;
pub mod parse_util;

// Model and parsing
pub mod message;
pub mod normalizer;
pub mod parser;

// Formatting
pub mod context;
pub mod formatter;
pub mod matcher;
pub mod parameters;
pub mod value;

// Storage
pub mod bundle;
pub mod pack;

pub mod config;
pub mod error;

// Re-exports
pub use bundle::{MessageBundle, TableRow};
pub use config::MessageConfig;
pub use context::{MessageContext, MessageContextBuilder};
pub use error::{
    BundleError, ConfigError, FormatErrorKind, MessageError, MessageFormatError, MessageParserError,
    PackError, Result,
};
pub use formatter::{FormattableType, FormatterContext, FormatterRegistry, ParameterFormatter};
pub use locale::Locale;
pub use message::{Message, MessagePart, Text};
pub use normalizer::{LruNormalizer, MessagePartNormalizer, NoOpNormalizer, UnboundedNormalizer};
pub use pack::PackOptions;
pub use parameters::{NoParameters, ParameterMap, Parameters};
pub use parser::MessageParser;
pub use value::{FormattableObject, Value};
