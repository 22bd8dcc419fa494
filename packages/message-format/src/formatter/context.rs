//! State handed to a formatter while it renders one parameter.

use std::sync::Arc;

use super::ParameterFormatter;
use crate::context::MessageContext;
use crate::error::{FormatErrorKind, MessageFormatError};
use crate::locale::Locale;
use crate::matcher::{self, CompareType, KeyTypes, MatchContext, MatchResult};
use crate::message::{ConfigMap, ConfigValue, Message, Text};
use crate::parameters::Parameters;
use crate::value::Value;

/// What a formatter sees while formatting one parameter.
#[derive(Clone, Copy)]
pub struct FormatterContext<'a> {
    context: &'a MessageContext,
    parameters: &'a dyn Parameters,
    format: Option<&'a str>,
    config: &'a ConfigMap,
}

impl<'a> FormatterContext<'a> {
    pub fn new(
        context: &'a MessageContext,
        parameters: &'a dyn Parameters,
        format: Option<&'a str>,
        config: &'a ConfigMap,
    ) -> Self {
        FormatterContext {
            context,
            parameters,
            format,
            config,
        }
    }

    pub fn message_context(&self) -> &'a MessageContext {
        self.context
    }

    pub fn parameters(&self) -> &'a dyn Parameters {
        self.parameters
    }

    /// Explicit format name of the parameter
    pub fn format_name(&self) -> Option<&'a str> {
        self.format
    }

    pub fn config(&self) -> &'a ConfigMap {
        self.config
    }

    pub fn locale(&self) -> &'a Locale {
        self.context.locale(self.parameters)
    }

    pub fn parameter_value(&self, name: &str) -> Option<&'a Value> {
        self.parameters.parameter_value(name)
    }

    pub fn parameter_names(&self) -> Vec<&'a str> {
        self.parameters.parameter_names()
    }

    pub fn formatter(&self, format: Option<&str>, type_name: &str) -> Arc<dyn ParameterFormatter> {
        self.context.formatters().resolve(format, type_name)
    }

    /// Value of a `name:value` entry, falling back to the configured defaults.
    pub fn config_value(&self, name: &str) -> Option<&'a ConfigValue> {
        self.config
            .config_value(name)
            .or_else(|| self.context.defaults().config_value(name))
    }

    pub fn config_string(&self, name: &str) -> Option<String> {
        self.config_value(name).and_then(ConfigValue::as_string)
    }

    pub fn config_number(&self, name: &str) -> Option<i64> {
        self.config_value(name).and_then(ConfigValue::as_number)
    }

    pub fn config_bool(&self, name: &str) -> Option<bool> {
        self.config_value(name).and_then(ConfigValue::as_bool)
    }

    /// Message of the best matching map entry for `value`, considering only
    /// keys of the given types.
    pub fn map_message(
        &self,
        value: &Value,
        key_types: KeyTypes,
        include_default: bool,
    ) -> Result<Option<Arc<Message>>, MessageFormatError> {
        match matcher::select(self.config, value, key_types, self, include_default) {
            None => Ok(None),
            Some(config_value) => config_value
                .as_message(self.context.parser())
                .map(Some)
                .map_err(|e| MessageFormatError::new(FormatErrorKind::NestedTemplate(e))),
        }
    }

    /// Formats a nested message with the same parameters.
    pub fn format_message(&self, message: &Message) -> Result<Text, MessageFormatError> {
        message.format_text(self.context, self.parameters)
    }

    /// Formats `value` with the formatter resolved for `format` and its type.
    pub fn format_value(&self, value: &Value, format: Option<&str>) -> Result<Text, MessageFormatError> {
        let formatter = self.formatter(format, value.type_name());
        let ctx = FormatterContext {
            context: self.context,
            parameters: self.parameters,
            format,
            config: self.config,
        };
        formatter.format(&ctx, value)
    }

    /// Size of `value` according to the first formatter of its type that knows one.
    pub fn size_of(&self, value: &Value) -> Option<u64> {
        self.context
            .formatters()
            .formatters_for(value.type_name())
            .iter()
            .find_map(|formatter| formatter.size(value))
    }
}

impl MatchContext for FormatterContext<'_> {
    fn locale(&self) -> &Locale {
        self.context.locale(self.parameters)
    }

    fn match_empty(&self, compare: CompareType, value: &Value) -> MatchResult {
        self.context
            .formatters()
            .formatters_for(value.type_name())
            .iter()
            .find_map(|formatter| formatter.match_empty(compare, value))
            .unwrap_or_else(|| matcher::default_match_empty(compare, value))
    }
}
