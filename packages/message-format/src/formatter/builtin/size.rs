use crate::error::MessageFormatError;
use crate::formatter::{FormatterContext, ParameterFormatter};
use crate::matcher::KeyTypes;
use crate::message::Text;
use crate::value::Value;

/// Formats the size of a value: string length, list length, map entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeFormatter;

impl ParameterFormatter for SizeFormatter {
    fn name(&self) -> Option<&str> {
        Some("size")
    }

    fn format(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        let size = if value.is_null() {
            0
        } else {
            ctx.size_of(value).unwrap_or(0)
        };
        let size = Value::from(size);

        match ctx.map_message(&size, KeyTypes::NUMBER, true)? {
            Some(message) => ctx.format_message(&message),
            None => ctx.format_value(&size, None),
        }
    }
}
