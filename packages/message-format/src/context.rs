//! Message context
//!
//! Ties configuration, parser, normalizer and formatter registry together. A
//! context is immutable after construction and can format from many threads.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::MessageConfig;
use crate::error::{ConfigError, MessageError, MessageFormatError, MessageParserError};
use crate::formatter::{FormatterContext, FormatterRegistry};
use crate::locale::Locale;
use crate::message::{ConfigMap, Message, ParameterPart, Text};
use crate::normalizer::{LruNormalizer, MessagePartNormalizer};
use crate::parameters::Parameters;
use crate::parser::MessageParser;
use crate::value::Value;

static NULL: Value = Value::Null;

#[derive(Debug)]
pub struct MessageContext {
    config: MessageConfig,
    parser: MessageParser,
    formatters: Arc<FormatterRegistry>,
    defaults: ConfigMap,
}

impl MessageContext {
    pub fn new(config: MessageConfig) -> Result<Self, ConfigError> {
        MessageContext::builder().config(config).build()
    }

    pub fn builder() -> MessageContextBuilder {
        MessageContextBuilder::default()
    }

    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Parameter configuration used when a parameter's map has no own entry
    pub fn defaults(&self) -> &ConfigMap {
        &self.defaults
    }

    /// Locale to format with: the parameters' locale unless it is the root
    /// locale and a default locale is configured.
    pub fn locale<'p>(&'p self, parameters: &'p dyn Parameters) -> &'p Locale {
        let locale = parameters.locale();
        match &self.config.default_locale {
            Some(default) if locale.is_root() => default,
            _ => locale,
        }
    }

    pub fn parse(&self, template: &str) -> Result<Arc<Message>, MessageParserError> {
        self.parser.parse(template)
    }

    pub fn parse_with_code(&self, code: &str, template: &str) -> Result<Arc<Message>, MessageParserError> {
        self.parser.parse_with_code(code, template)
    }

    pub fn format(&self, message: &Message, parameters: &dyn Parameters) -> Result<String, MessageFormatError> {
        message.format(self, parameters)
    }

    /// Parses and formats a template in one go.
    pub fn format_template(&self, template: &str, parameters: &dyn Parameters) -> crate::error::Result<String> {
        let message = self.parse(template)?;
        self.format(&message, parameters)
            .map_err(|e| MessageError::from(e.with_template(template)))
    }

    /// All parameter names referenced by the message, including the ones
    /// inside nested templates. Nested templates are parsed as needed; ones
    /// with syntax errors are skipped.
    pub fn parameter_names(&self, message: &Message) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        message.collect_parameter_names(&mut names, &mut |value| value.as_message(&self.parser).ok());
        names
    }

    pub(crate) fn format_parameter(
        &self,
        part: &ParameterPart,
        parameters: &dyn Parameters,
    ) -> Result<Text, MessageFormatError> {
        let value = match parameters.parameter_value(&part.name) {
            Some(value) => value,
            None if self.config.strict_parameters => {
                return Err(MessageFormatError::missing_parameter(part.name.as_str()))
            }
            None => {
                tracing::trace!(parameter = %part.name, "absent parameter formatted as null");
                &NULL
            }
        };

        let format = part.format.as_deref();
        FormatterContext::new(self, parameters, format, &part.config).format_value(value, format)
    }
}

impl Default for MessageContext {
    fn default() -> Self {
        MessageContext {
            config: MessageConfig::default(),
            parser: MessageParser::new(Arc::new(LruNormalizer::default())),
            formatters: Arc::new(FormatterRegistry::with_defaults()),
            defaults: ConfigMap::new(),
        }
    }
}

/// Assembles a [`MessageContext`]; parts not given are created from the config.
#[derive(Default)]
pub struct MessageContextBuilder {
    config: MessageConfig,
    normalizer: Option<Arc<dyn MessagePartNormalizer>>,
    formatters: Option<Arc<FormatterRegistry>>,
}

impl MessageContextBuilder {
    pub fn config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn MessagePartNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Registry to format with; it may be shared between contexts.
    pub fn formatters(mut self, formatters: Arc<FormatterRegistry>) -> Self {
        self.formatters = Some(formatters);
        self
    }

    pub fn build(self) -> Result<MessageContext, ConfigError> {
        self.config.validate()?;

        let normalizer = match self.normalizer {
            Some(normalizer) => normalizer,
            None => self.config.create_normalizer()?,
        };
        let formatters = self
            .formatters
            .unwrap_or_else(|| Arc::new(FormatterRegistry::with_defaults()));
        let defaults = self.config.default_config_map();

        tracing::debug!(normalizer = ?self.config.normalizer, defaults = defaults.len(), "message context created");

        Ok(MessageContext {
            config: self.config,
            parser: MessageParser::new(normalizer),
            formatters,
            defaults,
        })
    }
}
