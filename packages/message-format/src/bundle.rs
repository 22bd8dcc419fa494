//! Message bundles
//!
//! A bundle maps message codes to messages. Bundles are compiled from
//! `(code, locale, template)` tables and can be packed as a whole.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::context::MessageContext;
use crate::error::{BundleError, MessageError, Result};
use crate::locale::Locale;
use crate::message::Message;
use crate::pack::{self, PackOptions};
use crate::parameters::Parameters;

/// One row of a message table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub code: String,
    pub locale: Locale,
    pub template: String,
}

impl TableRow {
    pub fn new(code: impl Into<String>, locale: Locale, template: impl Into<String>) -> Self {
        TableRow {
            code: code.into(),
            locale,
            template: template.into(),
        }
    }
}

/// Messages by code, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: IndexMap<String, Arc<Message>>,
}

impl MessageBundle {
    pub fn new() -> Self {
        MessageBundle::default()
    }

    /// Compiles a table into messages with code and locale variants. Rows of
    /// one code keep their order; codes are compiled in parallel.
    pub fn compile_table(context: &MessageContext, rows: impl IntoIterator<Item = TableRow>) -> Result<Self> {
        let mut table: IndexMap<String, Vec<(Locale, String)>> = IndexMap::new();
        for row in rows {
            let variants = table.entry(row.code.clone()).or_default();
            if variants.iter().any(|(locale, _)| *locale == row.locale) {
                return Err(BundleError::DuplicateLocale {
                    code: row.code,
                    locale: row.locale,
                }
                .into());
            }
            variants.push((row.locale, row.template));
        }

        let table: Vec<(String, Vec<(Locale, String)>)> = table.into_iter().collect();
        let compiled = table
            .par_iter()
            .map(|(code, variants)| -> Result<(String, Arc<Message>)> {
                let templates: Vec<(Locale, &str)> = variants
                    .iter()
                    .map(|(locale, template)| (locale.clone(), template.as_str()))
                    .collect();
                let message = context.parser().parse_locales(Some(code), &templates)?;
                Ok((code.clone(), message))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(codes = compiled.len(), "compiled message table");

        let mut bundle = MessageBundle::new();
        for (code, message) in compiled {
            bundle.insert(&code, message)?;
        }
        Ok(bundle)
    }

    /// Adds a message carrying a code.
    pub fn add(&mut self, message: Arc<Message>) -> std::result::Result<(), BundleError> {
        let code = message.code().ok_or(BundleError::MissingCode)?.to_string();
        self.insert(&code, message)
    }

    /// Adds a message under `code`; codes must be unique.
    pub fn insert(&mut self, code: &str, message: Arc<Message>) -> std::result::Result<(), BundleError> {
        if self.messages.contains_key(code) {
            return Err(BundleError::DuplicateCode(code.to_string()));
        }
        self.messages.insert(code.to_string(), message);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&Arc<Message>> {
        self.messages.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.messages.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Message>)> {
        self.messages.iter().map(|(code, message)| (code.as_str(), message))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn message(&self, code: &str) -> std::result::Result<&Arc<Message>, BundleError> {
        self.messages
            .get(code)
            .ok_or_else(|| BundleError::UnknownCode(code.to_string()))
    }

    /// Formats the message with the given code.
    pub fn format(&self, context: &MessageContext, code: &str, parameters: &dyn Parameters) -> Result<String> {
        let message = self.message(code)?;
        context
            .format(message, parameters)
            .map_err(|e| MessageError::from(e.with_code(code)))
    }

    /// Parameter names used by the message with the given code.
    pub fn parameter_names(&self, context: &MessageContext, code: &str) -> Result<BTreeSet<String>> {
        Ok(context.parameter_names(self.message(code)?))
    }

    pub fn pack<W: Write>(&self, options: PackOptions, writer: W) -> Result<()> {
        pack::pack_all(self.messages.values().map(Arc::as_ref), options, writer)?;
        Ok(())
    }

    /// Reads a packed bundle; every message must carry a unique code.
    pub fn unpack<R: Read>(reader: R) -> Result<Self> {
        let mut bundle = MessageBundle::new();
        for message in pack::unpack_all(reader)? {
            bundle.add(message)?;
        }
        Ok(bundle)
    }
}
