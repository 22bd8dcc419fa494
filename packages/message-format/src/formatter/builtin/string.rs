use crate::error::MessageFormatError;
use crate::formatter::types::OBJECT_TYPE;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::matcher::KeyTypes;
use crate::message::Text;
use crate::value::{Value, CHAR_TYPE, STRING_TYPE};

/// Formats strings, characters and, as last resort, any value by its text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringFormatter;

impl ParameterFormatter for StringFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![
            FormattableType::new(STRING_TYPE),
            FormattableType::with_order(CHAR_TYPE, 125),
            FormattableType::with_order(OBJECT_TYPE, 255),
        ]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        if value.is_null() {
            return Ok(Text::empty());
        }

        if let Some(message) = ctx.map_message(value, KeyTypes::STRING, true)? {
            return ctx.format_message(&message);
        }

        Ok(Text::no_space(&value.to_string()))
    }

    fn size(&self, value: &Value) -> Option<u64> {
        value.as_text().map(|text| text.chars().count() as u64)
    }
}
