use crate::error::MessageFormatError;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::matcher::{self, CompareType, MatchResult};
use crate::message::Text;
use crate::value::{Value, OPTIONAL_TYPE, SUPPLIER_TYPE};

/// Unwraps optional values; an absent value formats as empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalFormatter;

impl ParameterFormatter for OptionalFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(OPTIONAL_TYPE)]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        match value {
            Value::Optional(Some(inner)) => ctx.format_value(inner, None),
            _ => Ok(Text::empty()),
        }
    }

    fn match_empty(&self, compare: CompareType, value: &Value) -> Option<MatchResult> {
        match value {
            Value::Optional(inner) => Some(matcher::match_empty_size(compare, usize::from(inner.is_some()))),
            _ => None,
        }
    }

    fn size(&self, value: &Value) -> Option<u64> {
        match value {
            Value::Optional(inner) => Some(u64::from(inner.is_some())),
            _ => None,
        }
    }
}

/// Evaluates supplied values and formats the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct SupplierFormatter;

impl ParameterFormatter for SupplierFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(SUPPLIER_TYPE)]
    }

    fn format(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        match value {
            Value::Supplier(supplier) => ctx.format_value(&supplier.get(), ctx.format_name()),
            _ => self.format_value(ctx, value),
        }
    }
}
