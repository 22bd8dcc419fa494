//! Error types
//!
//! Parse, format, pack and bundle errors. Parse and format errors collect the
//! context they were raised in (message code, template, locale, parameter) while
//! they propagate outward.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::locale::{Locale, LocaleError};
use crate::parse_util::ParseError;

/// Umbrella error of the crate
#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Parse(#[from] MessageParserError),
    #[error(transparent)]
    Format(#[from] MessageFormatError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

pub type Result<T> = std::result::Result<T, MessageError>;

/// Syntax error in a message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageParserError {
    input: Arc<str>,
    error: ParseError,
    code: Option<String>,
    template: Option<String>,
    locale: Option<Locale>,
}

impl MessageParserError {
    pub fn new(input: impl Into<Arc<str>>, error: ParseError) -> Self {
        MessageParserError {
            input: input.into(),
            error,
            code: None,
            template: None,
            locale: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// The template source that failed to parse
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Character offset where the offending input starts
    pub fn start(&self) -> usize {
        self.error.start()
    }

    /// Character offset just after the offending input
    pub fn stop(&self) -> usize {
        self.error.stop()
    }

    /// The low-level syntax error
    pub fn syntax_error(&self) -> &ParseError {
        &self.error
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }
}

impl fmt::Display for MessageParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to parse")?;

        match (&self.template, &self.code) {
            (Some(template), Some(code)) => {
                write!(f, " template '{template}' for message with code '{code}'")?
            }
            (Some(template), None) => write!(f, " template '{template}'")?,
            (None, Some(code)) => write!(f, " message with code '{code}'")?,
            (None, None) => f.write_str(" message")?,
        }

        if let Some(locale) = &self.locale {
            let joiner = if self.code.is_some() { "and" } else { "for" };
            write!(f, " {} locale '{}'", joiner, locale.display_name())?;
        }

        write!(f, ": {}", self.error.contextual_message(&self.input))
    }
}

impl StdError for MessageParserError {}

/// Reason a message could not be formatted.
#[derive(Debug, Error)]
pub enum FormatErrorKind {
    /// A parameter referenced by the message has no value
    #[error("parameter '{0}' is not available")]
    MissingParameter(String),
    /// A quoted map value failed to parse when it was first selected
    #[error("nested template is invalid: {0}")]
    NestedTemplate(#[source] MessageParserError),
    /// A formatter reported a failure while rendering
    #[error("formatter '{formatter}' failed: {reason}")]
    FormatterFailed {
        formatter: String,
        reason: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl FormatErrorKind {
    /// Tells whether the error points at a mistake in the template or its
    /// parameters rather than at a failure while rendering.
    pub fn is_developer_error(&self) -> bool {
        !matches!(self, FormatErrorKind::FormatterFailed { .. })
    }
}

/// Error raised while formatting a message.
#[derive(Debug)]
pub struct MessageFormatError {
    kind: FormatErrorKind,
    code: Option<String>,
    template: Option<String>,
    locale: Option<Locale>,
    parameter: Option<String>,
}

impl MessageFormatError {
    pub fn new(kind: FormatErrorKind) -> Self {
        MessageFormatError {
            kind,
            code: None,
            template: None,
            locale: None,
            parameter: None,
        }
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        MessageFormatError::new(FormatErrorKind::MissingParameter(name.into()))
    }

    pub fn formatter_failed(formatter: impl Into<String>, reason: impl Into<String>) -> Self {
        MessageFormatError::new(FormatErrorKind::FormatterFailed {
            formatter: formatter.into(),
            reason: reason.into(),
            source: None,
        })
    }

    pub fn formatter_error<E>(formatter: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        MessageFormatError::new(FormatErrorKind::FormatterFailed {
            formatter: formatter.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        })
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Sets the parameter unless an inner parameter was already recorded.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        if self.parameter.is_none() {
            self.parameter = Some(parameter.into());
        }
        self
    }

    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn is_developer_error(&self) -> bool {
        self.kind.is_developer_error()
    }

    /// Context description without the cause, e.g.
    /// `failed to format parameter 'p' in template 't' for message with code 'c'`.
    pub fn description(&self) -> String {
        const PARAMETER: u8 = 0b0001;
        const LOCALE: u8 = 0b0010;
        const TEMPLATE: u8 = 0b0100;
        const CODE: u8 = 0b1000;

        let n = (if self.code.is_some() { CODE } else { 0 })
            | (if self.template.is_some() { TEMPLATE } else { 0 })
            | (if self.locale.is_some() { LOCALE } else { 0 })
            | (if self.parameter.is_some() { PARAMETER } else { 0 });

        let mut msg = String::from("failed to format");

        if n < TEMPLATE {
            msg.push_str(" message");
        }

        if let Some(parameter) = &self.parameter {
            msg.push_str(&format!(" parameter '{parameter}'"));
        }

        if let Some(template) = &self.template {
            if n & PARAMETER != 0 {
                msg.push_str(" in");
            }
            msg.push_str(&format!(" template '{template}'"));
        }

        if let Some(code) = &self.code {
            if n != CODE && n != CODE | LOCALE {
                msg.push_str(" for");
            }
            msg.push_str(&format!(" message with code '{code}'"));
        }

        if let Some(locale) = &self.locale {
            msg.push_str(if n & CODE != 0 { " and" } else { " for" });
            msg.push_str(&format!(" locale '{}'", locale.display_name()));
        }

        msg
    }
}

impl fmt::Display for MessageFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description(), self.kind)
    }
}

impl StdError for MessageFormatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.kind)
    }
}

/// Decoding and encoding errors of packed messages.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("not a packed message stream")]
    BadHeader,
    #[error("unsupported pack format version {0}")]
    UnsupportedVersion(u8),
    #[error("unexpected end of packed stream")]
    UnexpectedEof,
    #[error("unknown {kind} tag {tag}")]
    UnknownTag { kind: &'static str, tag: u8 },
    #[error("invalid UTF-8 in packed string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("inconsistent packed data: {0}")]
    Inconsistent(String),
    #[error("pack i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors maintaining a message bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("duplicate message code '{0}'")]
    DuplicateCode(String),
    #[error("unknown message code '{0}'")]
    UnknownCode(String),
    #[error("message without code can not be added to a bundle")]
    MissingCode,
    #[error("duplicate locale '{locale}' for message with code '{code}'")]
    DuplicateLocale { code: String, locale: Locale },
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("normalizer capacity must be greater than 0")]
    ZeroCapacity,
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
