use crate::error::MessageFormatError;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::matcher::{self, CompareType, MatchResult};
use crate::message::Text;
use crate::value::{Value, MAP_TYPE};

use super::list::join_items;

const DEFAULT_KEY_VALUE_SEPARATOR: &str = "=";
const DEFAULT_NULL: &str = "(null)";

/// Formats map entries as `key=value` items joined like a list.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapFormatter;

impl ParameterFormatter for MapFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(MAP_TYPE)]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        let Value::Map(entries) = value else {
            return Ok(Text::no_space(&value.to_string()));
        };

        let separator = ctx
            .config_string("map-kv-sep")
            .unwrap_or_else(|| DEFAULT_KEY_VALUE_SEPARATOR.to_string());
        let null_key = ctx
            .config_string("map-null-key")
            .unwrap_or_else(|| DEFAULT_NULL.to_string());
        let null_value = ctx
            .config_string("map-null-value")
            .unwrap_or_else(|| DEFAULT_NULL.to_string());

        let mut items = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = format_or(ctx, key, &null_key)?;
            let value = format_or(ctx, value, &null_value)?;
            items.push(Text::no_space(&format!("{key}{separator}{value}")));
        }

        Ok(join_items(ctx, items))
    }

    fn match_empty(&self, compare: CompareType, value: &Value) -> Option<MatchResult> {
        match value {
            Value::Map(entries) => Some(matcher::match_empty_size(compare, entries.len())),
            _ => None,
        }
    }

    fn size(&self, value: &Value) -> Option<u64> {
        match value {
            Value::Map(entries) => Some(entries.len() as u64),
            _ => None,
        }
    }
}

fn format_or(ctx: &FormatterContext<'_>, value: &Value, null: &str) -> Result<String, MessageFormatError> {
    if value.is_null() {
        return Ok(null.to_string());
    }
    Ok(ctx.format_value(value, None)?.into_string())
}
