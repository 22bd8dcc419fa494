//! Message model: the AST, parameter configuration and formatted text.

pub mod ast;
pub mod config;
mod format;
pub mod text;

pub use ast::{Message, MessagePart, ParameterPart, TextPart};
pub use config::{ConfigKey, ConfigMap, ConfigValue, DuplicateKey, StringValue};
pub use text::{Text, TextJoiner};
