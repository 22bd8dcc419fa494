use crate::error::MessageFormatError;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::matcher::KeyTypes;
use crate::message::Text;
use crate::value::{Value, BOOL_TYPE};

/// Formats booleans; as named format `bool` it converts numbers and strings too.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolFormatter;

impl ParameterFormatter for BoolFormatter {
    fn name(&self) -> Option<&str> {
        Some("bool")
    }

    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(BOOL_TYPE)]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        let Some(flag) = to_bool(value) else {
            return Ok(Text::empty());
        };

        if let Some(message) = ctx.map_message(&Value::Bool(flag), KeyTypes::BOOL, true)? {
            return ctx.format_message(&message);
        }

        Ok(Text::no_space(if flag { "true" } else { "false" }))
    }
}

/// Boolean reading of a value; `None` for null and absent values.
fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Optional(inner) => inner.as_deref().and_then(to_bool),
        Value::Supplier(supplier) => to_bool(&supplier.get()),
        _ => value
            .as_i64()
            .map(|v| v != 0)
            .or_else(|| value.as_f64().map(|v| v != 0.0 && !v.is_nan()))
            .or_else(|| Some(value.to_string().trim().eq_ignore_ascii_case("true"))),
    }
}
