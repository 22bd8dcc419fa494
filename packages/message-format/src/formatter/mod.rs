//! Parameter formatters
//!
//! A formatter renders a parameter value as text. Formatters are found by the
//! explicit format name of a parameter or by the runtime type of its value.

pub mod builtin;
mod context;
mod registry;
pub mod types;

pub use context::FormatterContext;
pub use registry::FormatterRegistry;
pub use types::TypeGraph;

use crate::error::MessageFormatError;
use crate::matcher::{CompareType, KeyTypes, MatchResult};
use crate::message::Text;
use crate::value::Value;

/// A runtime type covered by a formatter. Lower orders are tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattableType {
    pub type_name: String,
    pub order: i32,
}

impl FormattableType {
    pub const DEFAULT_ORDER: i32 = 127;

    pub fn new(type_name: &str) -> Self {
        FormattableType::with_order(type_name, FormattableType::DEFAULT_ORDER)
    }

    pub fn with_order(type_name: &str, order: i32) -> Self {
        FormattableType {
            type_name: type_name.to_string(),
            order,
        }
    }
}

pub trait ParameterFormatter: Send + Sync {
    /// Unique name used as explicit format, e.g. `%{n,choice,...}`
    fn name(&self) -> Option<&str> {
        None
    }

    /// Types this formatter is used for when no format is given
    fn formattable_types(&self) -> Vec<FormattableType> {
        Vec::new()
    }

    /// Formats `value`. `null` and `empty` keys of the parameter's map are
    /// consulted before [`ParameterFormatter::format_value`].
    fn format(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        if let Some(message) = ctx.map_message(value, KeyTypes::EMPTY_NULL, false)? {
            return ctx.format_message(&message);
        }

        self.format_value(ctx, value)
    }

    fn format_value(&self, _ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        Ok(Text::no_space(&value.to_string()))
    }

    /// How well `value` matches an `empty` key; `None` leaves the decision to
    /// the default string based matching.
    fn match_empty(&self, _compare: CompareType, _value: &Value) -> Option<MatchResult> {
        None
    }

    /// Size of `value` as used by the `size` formatter
    fn size(&self, _value: &Value) -> Option<u64> {
        None
    }
}
