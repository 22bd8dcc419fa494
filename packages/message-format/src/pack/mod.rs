//! Binary pack format
//!
//! A pack starts with the magic `%{msg}` and a flag byte `0bc1vv_vvvv` where
//! `c` marks a gzip compressed body and `v` is the format version. The body
//! is a bit stream holding the number of messages followed by the messages.

mod stream;

use std::io::{Read, Write};
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

pub use stream::{PackReader, PackWriter};

use crate::error::PackError;
use crate::locale::Locale;
use crate::matcher::CompareType;
use crate::message::{
    ConfigKey, ConfigMap, ConfigValue, Message, MessagePart, ParameterPart, StringValue, TextPart,
};
use crate::normalizer::{MessagePartNormalizer, UnboundedNormalizer};

pub const PACK_MAGIC: &[u8; 6] = b"%{msg}";
pub const PACK_VERSION: u8 = 1;

const FLAG_MARKER: u8 = 0b0100_0000;
const FLAG_COMPRESSED: u8 = 0b1000_0000;
const VERSION_MASK: u8 = 0b0011_1111;

const MESSAGE_EMPTY: u8 = 0;
const MESSAGE_SINGLE_PART: u8 = 1;
const MESSAGE_MULTIPART: u8 = 2;
const MESSAGE_LOCALE_VARIANTS: u8 = 3;
const MESSAGE_WITH_CODE: u8 = 4;

const PART_NO_SPACE_TEXT: u8 = 0;
const PART_TEXT: u8 = 1;
const PART_PARAMETER: u8 = 2;

const KEY_BOOL: u8 = 0;
const KEY_EMPTY: u8 = 1;
const KEY_NAME: u8 = 2;
const KEY_NULL: u8 = 3;
const KEY_NUMBER: u8 = 4;
const KEY_STRING: u8 = 5;

const VALUE_BOOL: u8 = 0;
const VALUE_MESSAGE: u8 = 1;
const VALUE_NUMBER: u8 = 2;
const VALUE_STRING: u8 = 3;

/// Deepest message nesting accepted when unpacking
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Gzip the body
    pub compress: bool,
}

/// Packs a single message.
pub fn pack(message: &Message, options: PackOptions) -> Result<Vec<u8>, PackError> {
    let mut bytes = Vec::new();
    pack_all(std::iter::once(message), options, &mut bytes)?;
    Ok(bytes)
}

/// Packs messages into `writer`.
pub fn pack_all<'a, I, W>(messages: I, options: PackOptions, mut writer: W) -> Result<(), PackError>
where
    I: IntoIterator<Item = &'a Message>,
    I::IntoIter: ExactSizeIterator,
    W: Write,
{
    let messages = messages.into_iter();
    let count = messages.len();

    let mut stream = PackWriter::new();
    stream.write_small_var(count);
    for message in messages {
        pack_message(&mut stream, message);
    }
    let body = stream.finish();

    let mut flag = FLAG_MARKER | PACK_VERSION;
    if options.compress {
        flag |= FLAG_COMPRESSED;
    }

    writer.write_all(PACK_MAGIC)?;
    writer.write_all(&[flag])?;

    if options.compress {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(&body)?;
        encoder.finish()?;
    } else {
        writer.write_all(&body)?;
    }

    tracing::debug!(count, body = body.len(), compressed = options.compress, "packed messages");
    Ok(())
}

/// Unpacks a stream holding exactly one message.
pub fn unpack(bytes: &[u8]) -> Result<Arc<Message>, PackError> {
    let mut messages = unpack_all(bytes)?;
    let count = messages.len();
    match messages.pop() {
        Some(message) if count == 1 => Ok(message),
        _ => Err(PackError::Inconsistent(format!("expected 1 message, found {count}"))),
    }
}

/// Unpacks all messages of a stream. Structurally equal nodes are shared.
pub fn unpack_all<R: Read>(mut reader: R) -> Result<Vec<Arc<Message>>, PackError> {
    let mut header = [0u8; 7];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => PackError::BadHeader,
        _ => PackError::Io(e),
    })?;

    if &header[..6] != PACK_MAGIC || header[6] & FLAG_MARKER == 0 {
        return Err(PackError::BadHeader);
    }
    let version = header[6] & VERSION_MASK;
    if version != PACK_VERSION {
        return Err(PackError::UnsupportedVersion(version));
    }

    let compressed = header[6] & FLAG_COMPRESSED != 0;
    let mut body = Vec::new();
    if compressed {
        GzDecoder::new(reader).read_to_end(&mut body)?;
    } else {
        reader.read_to_end(&mut body)?;
    }

    let mut unpacker = Unpacker {
        stream: PackReader::new(&body),
        normalizer: UnboundedNormalizer::new(),
    };

    let count = unpacker.stream.read_small_var()?;
    let mut messages = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        messages.push(unpacker.message(0)?);
    }

    tracing::debug!(count, shared = unpacker.normalizer.len(), compressed, "unpacked messages");
    Ok(messages)
}

fn pack_message(stream: &mut PackWriter, message: &Message) {
    match message {
        Message::Empty => stream.write_bits(u64::from(MESSAGE_EMPTY), 3),
        Message::SinglePart(part) => {
            stream.write_bits(u64::from(MESSAGE_SINGLE_PART), 3);
            pack_part(stream, part);
        }
        Message::Multipart(parts) => {
            stream.write_bits(u64::from(MESSAGE_MULTIPART), 3);
            stream.write_small_var(parts.len());
            for part in parts.iter() {
                pack_part(stream, part);
            }
        }
        Message::LocaleVariants(variants) => {
            stream.write_bits(u64::from(MESSAGE_LOCALE_VARIANTS), 3);
            stream.write_small_var(variants.len());
            for (locale, message) in variants.iter() {
                stream.write_string(Some(&locale.to_string()));
                pack_message(stream, message);
            }
        }
        Message::WithCode { code, message } => {
            stream.write_bits(u64::from(MESSAGE_WITH_CODE), 3);
            stream.write_string(Some(code));
            pack_message(stream, message);
        }
    }
}

fn pack_part(stream: &mut PackWriter, part: &MessagePart) {
    match part {
        MessagePart::Text(text) if !text.space_before && !text.space_after => {
            stream.write_bits(u64::from(PART_NO_SPACE_TEXT), 2);
            stream.write_string(Some(&text.text));
        }
        MessagePart::Text(text) => {
            stream.write_bits(u64::from(PART_TEXT), 2);
            stream.write_bool(text.space_before);
            stream.write_bool(text.space_after);
            stream.write_string(Some(&text.text));
        }
        MessagePart::Parameter(parameter) => {
            stream.write_bits(u64::from(PART_PARAMETER), 2);
            stream.write_bool(parameter.space_before);
            stream.write_bool(parameter.space_after);
            stream.write_string(Some(&parameter.name));
            stream.write_string(parameter.format.as_deref());
            pack_config(stream, &parameter.config);
        }
    }
}

fn pack_config(stream: &mut PackWriter, config: &ConfigMap) {
    stream.write_small_var(config.len());
    for (key, value) in config.entries() {
        pack_key(stream, key);
        pack_value(stream, value);
    }

    stream.write_bool(config.default_value().is_some());
    if let Some(value) = config.default_value() {
        pack_value(stream, value);
    }
}

fn pack_key(stream: &mut PackWriter, key: &ConfigKey) {
    match key {
        ConfigKey::Bool(b) => {
            stream.write_bits(u64::from(KEY_BOOL), 3);
            stream.write_bool(*b);
        }
        ConfigKey::Empty(compare) => {
            stream.write_bits(u64::from(KEY_EMPTY), 3);
            pack_compare(stream, *compare);
        }
        ConfigKey::Name(name) => {
            stream.write_bits(u64::from(KEY_NAME), 3);
            stream.write_string(Some(name));
        }
        ConfigKey::Null(compare) => {
            stream.write_bits(u64::from(KEY_NULL), 3);
            pack_compare(stream, *compare);
        }
        ConfigKey::Number(compare, number) => {
            stream.write_bits(u64::from(KEY_NUMBER), 3);
            pack_compare(stream, *compare);
            stream.write_long_var(*number);
        }
        ConfigKey::String(compare, string) => {
            stream.write_bits(u64::from(KEY_STRING), 3);
            pack_compare(stream, *compare);
            stream.write_string(Some(string));
        }
    }
}

fn pack_compare(stream: &mut PackWriter, compare: CompareType) {
    stream.write_bits(u64::from(compare.ordinal()), 3);
}

fn pack_value(stream: &mut PackWriter, value: &ConfigValue) {
    match value {
        ConfigValue::Bool(b) => {
            stream.write_bits(u64::from(VALUE_BOOL), 2);
            stream.write_bool(*b);
        }
        ConfigValue::Message(message) => {
            stream.write_bits(u64::from(VALUE_MESSAGE), 2);
            pack_message(stream, message);
        }
        ConfigValue::Number(number) => {
            stream.write_bits(u64::from(VALUE_NUMBER), 2);
            stream.write_long_var(*number);
        }
        ConfigValue::String(string) => {
            stream.write_bits(u64::from(VALUE_STRING), 2);
            stream.write_string(Some(string.source()));
        }
    }
}

struct Unpacker<'a> {
    stream: PackReader<'a>,
    normalizer: UnboundedNormalizer,
}

impl Unpacker<'_> {
    fn message(&mut self, depth: usize) -> Result<Arc<Message>, PackError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(PackError::Inconsistent("message nesting too deep".to_string()));
        }
        let depth = depth + 1;

        let message = match self.stream.read_small(3)? {
            MESSAGE_EMPTY => Message::Empty,
            MESSAGE_SINGLE_PART => Message::SinglePart(self.part(depth)?),
            MESSAGE_MULTIPART => {
                let count = self.stream.read_small_var()?;
                if count < 2 {
                    return Err(PackError::Inconsistent(format!("multipart message with {count} parts")));
                }
                let parts = (0..count)
                    .map(|_| self.part(depth))
                    .collect::<Result<Vec<_>, _>>()?;
                Message::Multipart(parts.into())
            }
            MESSAGE_LOCALE_VARIANTS => {
                let count = self.stream.read_small_var()?;
                let mut variants = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    let tag = self.stream.read_required_string("locale")?;
                    let locale = Locale::parse(&tag)
                        .map_err(|e| PackError::Inconsistent(e.to_string()))?;
                    let variant = self.message(depth)?;
                    if matches!(*variant, Message::LocaleVariants(_) | Message::WithCode { .. }) {
                        return Err(PackError::Inconsistent(format!(
                            "locale variant '{tag}' is not a plain message"
                        )));
                    }
                    variants.push((locale, variant));
                }
                Message::locale_variants(variants)
                    .ok_or_else(|| PackError::Inconsistent("message without locale variants".to_string()))?
            }
            MESSAGE_WITH_CODE => {
                let code = self.stream.read_required_string("message code")?;
                let message = self.message(depth)?;
                if message.code().is_some() {
                    return Err(PackError::Inconsistent(format!("message code '{code}' wraps another code")));
                }
                Message::with_code(&code, message)
            }
            tag => return Err(PackError::UnknownTag { kind: "message", tag }),
        };

        Ok(self.normalizer.normalize_message(Arc::new(message)))
    }

    fn part(&mut self, depth: usize) -> Result<MessagePart, PackError> {
        let part = match self.stream.read_small(2)? {
            PART_NO_SPACE_TEXT => {
                let text = self.stream.read_required_string("text")?;
                MessagePart::Text(Arc::new(TextPart::new(text, false, false)))
            }
            PART_TEXT => {
                let space_before = self.stream.read_bool()?;
                let space_after = self.stream.read_bool()?;
                let text = self.stream.read_required_string("text")?;
                MessagePart::Text(Arc::new(TextPart::new(text, space_before, space_after)))
            }
            PART_PARAMETER => {
                let space_before = self.stream.read_bool()?;
                let space_after = self.stream.read_bool()?;
                let mut parameter = ParameterPart::new(self.stream.read_required_string("parameter name")?)
                    .with_spaces(space_before, space_after);
                parameter.format = self.stream.read_string()?;
                parameter.config = self.config(depth)?;
                MessagePart::Parameter(Arc::new(parameter))
            }
            tag => return Err(PackError::UnknownTag { kind: "message part", tag }),
        };

        Ok(self.normalizer.normalize_part(part))
    }

    fn config(&mut self, depth: usize) -> Result<ConfigMap, PackError> {
        let mut config = ConfigMap::new();

        let count = self.stream.read_small_var()?;
        for _ in 0..count {
            let key = self.key()?;
            let value = self.value(depth)?;
            config
                .insert(key, value)
                .map_err(|e| PackError::Inconsistent(format!("{e} {:?}", e.0)))?;
        }

        if self.stream.read_bool()? {
            let value = self.value(depth)?;
            config
                .set_default(value)
                .map_err(|e| PackError::Inconsistent(e.to_string()))?;
        }

        Ok(config)
    }

    fn key(&mut self) -> Result<ConfigKey, PackError> {
        Ok(match self.stream.read_small(3)? {
            KEY_BOOL => ConfigKey::Bool(self.stream.read_bool()?),
            KEY_EMPTY => ConfigKey::Empty(self.compare()?),
            KEY_NAME => ConfigKey::Name(self.stream.read_required_string("key name")?),
            KEY_NULL => ConfigKey::Null(self.compare()?),
            KEY_NUMBER => {
                let compare = self.compare()?;
                ConfigKey::Number(compare, self.stream.read_long_var()?)
            }
            KEY_STRING => {
                let compare = self.compare()?;
                ConfigKey::String(compare, self.stream.read_required_string("key string")?)
            }
            tag => return Err(PackError::UnknownTag { kind: "config key", tag }),
        })
    }

    fn compare(&mut self) -> Result<CompareType, PackError> {
        let ordinal = self.stream.read_small(3)?;
        CompareType::from_ordinal(ordinal).ok_or(PackError::UnknownTag {
            kind: "comparator",
            tag: ordinal,
        })
    }

    fn value(&mut self, depth: usize) -> Result<ConfigValue, PackError> {
        Ok(match self.stream.read_small(2)? {
            VALUE_BOOL => ConfigValue::Bool(self.stream.read_bool()?),
            VALUE_MESSAGE => ConfigValue::Message(self.message(depth)?),
            VALUE_NUMBER => ConfigValue::Number(self.stream.read_long_var()?),
            VALUE_STRING => ConfigValue::String(StringValue::from_source(
                &self.stream.read_required_string("config value")?,
            )),
            tag => return Err(PackError::UnknownTag { kind: "config value", tag }),
        })
    }
}
