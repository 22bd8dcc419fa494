use crate::error::MessageFormatError;
use crate::formatter::types::ITERABLE_TYPE;
use crate::formatter::{FormattableType, FormatterContext, ParameterFormatter};
use crate::matcher::{self, CompareType, MatchResult};
use crate::message::{Text, TextJoiner};
use crate::value::Value;

const DEFAULT_SEPARATOR: &str = ", ";

/// Formats lists: `%{names,list-sep:' | ',list-max-size:3,list-value-more:'...'}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFormatter;

impl ParameterFormatter for ListFormatter {
    fn formattable_types(&self) -> Vec<FormattableType> {
        vec![FormattableType::new(ITERABLE_TYPE)]
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        let Value::List(values) = value else {
            return Ok(Text::no_space(&value.to_string()));
        };

        let mut items = Vec::with_capacity(values.len());
        for element in values {
            let text = ctx.format_value(element, None)?;
            if !text.is_empty() {
                items.push(text);
            }
        }

        Ok(join_items(ctx, items))
    }

    fn match_empty(&self, compare: CompareType, value: &Value) -> Option<MatchResult> {
        match value {
            Value::List(values) => Some(matcher::match_empty_size(compare, values.len())),
            _ => None,
        }
    }

    fn size(&self, value: &Value) -> Option<u64> {
        match value {
            Value::List(values) => Some(values.len() as u64),
            _ => None,
        }
    }
}

/// Joins formatted items using the `list-*` configuration of the parameter.
pub(crate) fn join_items(ctx: &FormatterContext<'_>, mut items: Vec<Text>) -> Text {
    let separator = ctx
        .config_string("list-sep")
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
    let last_separator = ctx.config_string("list-sep-last");

    let max_size = ctx
        .config_number("list-max-size")
        .filter(|&max| max > 0)
        .map(|max| max as usize);
    let mut more = None;

    if let Some(max) = max_size {
        if items.len() > max {
            items.truncate(max);
            more = ctx
                .config_string("list-value-more")
                .map(|more| Text::no_space(&more))
                .filter(|more| !more.is_empty());
        }
    }

    if let Some(more) = more.take() {
        // the "more" item is joined with the regular separator
        items.push(more);
        return join(&items, &separator, &separator);
    }

    let last = last_separator.as_deref().unwrap_or(&separator);
    join(&items, &separator, last)
}

fn join(items: &[Text], separator: &str, last_separator: &str) -> Text {
    let separator = Text::spaced(separator);
    let last_separator = Text::spaced(last_separator);
    let mut joiner = TextJoiner::new();

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            joiner.add(if i == items.len() - 1 {
                &last_separator
            } else {
                &separator
            });
        }
        joiner.add(item);
    }

    joiner.as_no_space_text()
}
