use crate::error::MessageFormatError;
use crate::formatter::types::NUMBER_TYPE;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::locale::Locale;
use crate::matcher::KeyTypes;
use crate::message::Text;
use crate::value::Value;

/// Formats integral and floating point numbers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberFormatter;

impl ParameterFormatter for NumberFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(NUMBER_TYPE)]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        if let Some(message) = ctx.map_message(value, KeyTypes::NUMBER | KeyTypes::BOOL, true)? {
            return ctx.format_message(&message);
        }

        Ok(Text::no_space(&number_text(value, ctx.locale())))
    }
}

/// Decimal text of a number using the locale's decimal separator.
pub(crate) fn number_text(value: &Value, locale: &Locale) -> String {
    let text = value.to_string();
    let separator = locale.decimal_separator();

    if value.as_f64().is_some() && separator != '.' {
        text.replace('.', &separator.to_string())
    } else {
        text
    }
}
