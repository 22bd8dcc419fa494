//! Message AST
//!
//! Immutable nodes produced by the parser and the pack codec. Nodes are shared
//! through `Arc`, so a tree can be formatted from many threads at once and
//! structurally equal fragments can be deduplicated by a normalizer.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::locale::{self, Locale};
use crate::message::config::ConfigMap;
use crate::message::ConfigValue;
use crate::parser::lexer::escape_text;

/// A literal run of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextPart {
    pub text: String,
    pub space_before: bool,
    pub space_after: bool,
}

impl TextPart {
    pub fn new(text: impl Into<String>, space_before: bool, space_after: bool) -> Self {
        TextPart {
            text: text.into(),
            space_before,
            space_after,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A `%{name,format,map}` reference to a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterPart {
    pub name: String,
    pub format: Option<String>,
    pub config: ConfigMap,
    pub space_before: bool,
    pub space_after: bool,
}

impl ParameterPart {
    pub fn new(name: impl Into<String>) -> Self {
        ParameterPart {
            name: name.into(),
            format: None,
            config: ConfigMap::new(),
            space_before: false,
            space_after: false,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_spaces(mut self, space_before: bool, space_after: bool) -> Self {
        self.space_before = space_before;
        self.space_after = space_after;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessagePart {
    Text(Arc<TextPart>),
    Parameter(Arc<ParameterPart>),
}

impl MessagePart {
    pub fn text(text: &str, space_before: bool, space_after: bool) -> Self {
        MessagePart::Text(Arc::new(TextPart::new(text, space_before, space_after)))
    }

    pub fn parameter(part: ParameterPart) -> Self {
        MessagePart::Parameter(Arc::new(part))
    }

    pub fn space_before(&self) -> bool {
        match self {
            MessagePart::Text(t) => t.space_before,
            MessagePart::Parameter(p) => p.space_before,
        }
    }

    pub fn space_after(&self) -> bool {
        match self {
            MessagePart::Text(t) => t.space_after,
            MessagePart::Parameter(p) => p.space_after,
        }
    }

    fn add_spaces(&mut self, space_before: bool, space_after: bool) {
        match self {
            MessagePart::Text(t) => {
                let t = Arc::make_mut(t);
                t.space_before |= space_before;
                t.space_after |= space_after;
            }
            MessagePart::Parameter(p) => {
                let p = Arc::make_mut(p);
                p.space_before |= space_before;
                p.space_after |= space_after;
            }
        }
    }

    /// Drops empty text parts; their space flags move to the neighbouring parts.
    pub(crate) fn fold_empty_text(parts: Vec<MessagePart>) -> Vec<MessagePart> {
        let mut folded: Vec<MessagePart> = Vec::with_capacity(parts.len());
        let mut pending_space = false;

        for mut part in parts {
            if let MessagePart::Text(t) = &part {
                if t.is_empty() {
                    let spaced = t.space_before || t.space_after;
                    match folded.last_mut() {
                        Some(last) => last.add_spaces(false, spaced),
                        None => pending_space |= spaced,
                    }
                    continue;
                }
            }

            if pending_space {
                part.add_spaces(true, false);
                pending_space = false;
            }
            folded.push(part);
        }

        folded
    }
}

impl fmt::Display for MessagePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessagePart::Text(t) => f.write_str(&escape_text(&t.text)),
            MessagePart::Parameter(p) => {
                write!(f, "%{{{}", p.name)?;
                if let Some(format) = &p.format {
                    write!(f, ",{format}")?;
                }
                if !p.config.is_empty() {
                    write!(f, ",{}", p.config)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    /// Formats to no text
    Empty,
    SinglePart(MessagePart),
    Multipart(Arc<[MessagePart]>),
    /// Localized variants in declaration order
    LocaleVariants(Arc<[(Locale, Arc<Message>)]>),
    WithCode { code: Arc<str>, message: Arc<Message> },
}

impl Message {
    /// Message for the given parts: no parts give `Empty`, one part `SinglePart`.
    pub fn from_parts(parts: Vec<MessagePart>) -> Message {
        let mut parts = MessagePart::fold_empty_text(parts);
        match parts.len() {
            0 => Message::Empty,
            1 => match parts.pop() {
                Some(part) => Message::SinglePart(part),
                None => Message::Empty,
            },
            _ => Message::Multipart(parts.into()),
        }
    }

    /// Message consisting of literal text only
    pub fn text(text: &str) -> Message {
        Message::from_parts(vec![MessagePart::text(text, false, false)])
    }

    /// Localized variants; `None` when no variant is given.
    pub fn locale_variants(variants: Vec<(Locale, Arc<Message>)>) -> Option<Message> {
        if variants.is_empty() {
            None
        } else {
            Some(Message::LocaleVariants(variants.into()))
        }
    }

    pub fn with_code(code: &str, message: Arc<Message>) -> Message {
        Message::WithCode {
            code: code.into(),
            message,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Message::WithCode { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The message without its code
    pub fn without_code(&self) -> &Message {
        match self {
            Message::WithCode { message, .. } => message.without_code(),
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Message::Empty => true,
            Message::WithCode { message, .. } => message.is_empty(),
            _ => false,
        }
    }

    /// Declared locales, in declaration order
    pub fn locales(&self) -> Vec<&Locale> {
        match self.without_code() {
            Message::LocaleVariants(variants) => variants.iter().map(|(l, _)| l).collect(),
            _ => Vec::new(),
        }
    }

    /// The variant used for `locale`
    pub fn for_locale(&self, locale: &Locale) -> &Message {
        match self.without_code() {
            Message::LocaleVariants(variants) => locale::select_variant(variants, locale)
                .map_or(self, |message| message.for_locale(locale)),
            other => other,
        }
    }

    pub fn parts(&self) -> &[MessagePart] {
        match self {
            Message::SinglePart(part) => std::slice::from_ref(part),
            Message::Multipart(parts) => parts,
            _ => &[],
        }
    }

    /// Names of the parameters referenced directly by the message and by its
    /// nested messages that are already available without parsing.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_parameter_names(&mut names, &mut |_| None);
        names
    }

    pub(crate) fn collect_parameter_names(
        &self,
        names: &mut BTreeSet<String>,
        nested: &mut dyn FnMut(&ConfigValue) -> Option<Arc<Message>>,
    ) {
        match self {
            Message::Empty => {}
            Message::SinglePart(_) | Message::Multipart(_) => {
                for part in self.parts() {
                    if let MessagePart::Parameter(p) = part {
                        names.insert(p.name.clone());
                        for value in p.config.values() {
                            let message = match value {
                                ConfigValue::Message(message) => Some(Arc::clone(message)),
                                other => nested(other),
                            };
                            if let Some(message) = message {
                                message.collect_parameter_names(names, nested);
                            }
                        }
                    }
                }
            }
            Message::LocaleVariants(variants) => {
                for (_, message) in variants.iter() {
                    message.collect_parameter_names(names, nested);
                }
            }
            Message::WithCode { message, .. } => message.collect_parameter_names(names, nested),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Empty => Ok(()),
            Message::SinglePart(_) | Message::Multipart(_) => {
                let parts = self.parts();
                for (i, part) in parts.iter().enumerate() {
                    let space = if i == 0 {
                        part.space_before()
                    } else {
                        parts[i - 1].space_after() || part.space_before()
                    };
                    if space {
                        f.write_str(" ")?;
                    }
                    write!(f, "{part}")?;
                }
                match parts.last() {
                    Some(last) if last.space_after() => f.write_str(" "),
                    _ => Ok(()),
                }
            }
            Message::LocaleVariants(variants) => {
                for (i, (locale, message)) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "[{}] {}", locale.display_name(), message)?;
                }
                Ok(())
            }
            Message::WithCode { message, .. } => write!(f, "{message}"),
        }
    }
}
