//! Message formatting
//!
//! Walks a message, picks the locale variant for the parameters and joins the
//! formatted parts. Errors pick up code, locale and parameter on the way out.

use crate::context::MessageContext;
use crate::error::MessageFormatError;
use crate::locale;
use crate::message::{Message, MessagePart, Text, TextJoiner};
use crate::parameters::Parameters;

impl Message {
    /// Formats the message keeping leading and trailing space flags.
    pub fn format_text(
        &self,
        context: &MessageContext,
        parameters: &dyn Parameters,
    ) -> Result<Text, MessageFormatError> {
        match self {
            Message::Empty => Ok(Text::empty()),
            Message::SinglePart(part) => part.format_text(context, parameters),
            Message::Multipart(parts) => {
                let mut joiner = TextJoiner::new();
                for part in parts.iter() {
                    joiner.add(&part.format_text(context, parameters)?);
                }
                Ok(joiner.as_spaced_text())
            }
            Message::LocaleVariants(variants) => {
                let locale = context.locale(parameters);
                match locale::select_variant(variants, locale) {
                    Some(message) => message
                        .format_text(context, parameters)
                        .map_err(|e| e.with_locale(locale.clone())),
                    None => Ok(Text::empty()),
                }
            }
            Message::WithCode { code, message } => message
                .format_text(context, parameters)
                .map_err(|e| e.with_code(code.as_ref())),
        }
    }

    /// Formats the message to a string without surrounding spaces.
    pub fn format(&self, context: &MessageContext, parameters: &dyn Parameters) -> Result<String, MessageFormatError> {
        self.format_text(context, parameters).map(Text::into_string)
    }
}

impl MessagePart {
    fn format_text(&self, context: &MessageContext, parameters: &dyn Parameters) -> Result<Text, MessageFormatError> {
        match self {
            MessagePart::Text(text) => Ok(Text::new(text.text.as_str(), text.space_before, text.space_after)),
            MessagePart::Parameter(parameter) => context
                .format_parameter(parameter, parameters)
                .map(|text| text.with_spaces(parameter.space_before, parameter.space_after))
                .map_err(|e| e.with_parameter(parameter.name.as_str())),
        }
    }
}
