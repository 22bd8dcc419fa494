use crate::error::MessageFormatError;
use crate::formatter::{FormatterContext, ParameterFormatter};
use crate::message::Text;
use crate::value::Value;

const DEFAULT_CLIP_SIZE: i64 = 64;
const MIN_CLIP_SIZE: i64 = 8;
const ELLIPSIS: &str = "...";

/// Clips the formatted value to `clip-size` characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipFormatter;

impl ParameterFormatter for ClipFormatter {
    fn name(&self) -> Option<&str> {
        Some("clip")
    }

    fn format_value(&self, ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
        if value.is_null() {
            return Ok(Text::empty());
        }

        let text = ctx.format_value(value, None)?;
        let max_size = ctx
            .config_number("clip-size")
            .unwrap_or(DEFAULT_CLIP_SIZE)
            .max(MIN_CLIP_SIZE) as usize;

        let s = text.text().trim();
        if s.chars().count() <= max_size {
            return Ok(text);
        }

        let clipped: String = s.chars().take(max_size - ELLIPSIS.len()).collect();
        Ok(Text::new(
            format!("{}{ELLIPSIS}", clipped.trim_end()),
            text.space_before(),
            text.space_after(),
        ))
    }
}
