use crate::error::MessageFormatError;
use crate::formatter::{FormatterContext, ParameterFormatter};
use crate::matcher::KeyTypes;
use crate::message::Text;
use crate::value::Value;

/// Selects a map entry for any value: `%{n,choice,1:'one',:'many'}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChoiceFormatter;

impl ParameterFormatter for ChoiceFormatter {
    fn name(&self) -> Option<&str> {
        Some("choice")
    }

    fn format(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        match ctx.map_message(value, KeyTypes::NO_NAME, true)? {
            Some(message) => ctx.format_message(&message),
            None => Ok(Text::empty()),
        }
    }
}
