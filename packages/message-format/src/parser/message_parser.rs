/**
 * Message Template Parser
 *
 * Recursive descent parser turning a token stream into a message AST.
 */

use std::sync::Arc;

use super::lexer::{Lexer, Token, TokenType};
use crate::error::MessageParserError;
use crate::locale::Locale;
use crate::matcher::CompareType;
use crate::message::{
    ConfigKey, ConfigMap, ConfigValue, Message, MessagePart, ParameterPart, StringValue,
};
use crate::normalizer::{MessagePartNormalizer, NoOpNormalizer};
use crate::parse_util::{ParseError, ParseSourceFile};

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parser for message templates
#[derive(Debug, Clone)]
pub struct MessageParser {
    lexer: Lexer,
    normalizer: Arc<dyn MessagePartNormalizer>,
}

impl MessageParser {
    pub fn new(normalizer: Arc<dyn MessagePartNormalizer>) -> Self {
        MessageParser {
            lexer: Lexer::new(),
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &Arc<dyn MessagePartNormalizer> {
        &self.normalizer
    }

    /// Parse a template into a message
    pub fn parse(&self, template: &str) -> Result<Arc<Message>, MessageParserError> {
        let tokens = self
            .lexer
            .tokenize(template)
            .map_err(|e| MessageParserError::new(template, e))?;

        ParseAst::new(template, &tokens, self.normalizer.as_ref())
            .parse_message()
            .map_err(|e| MessageParserError::new(template, e))
    }

    /// Parse a template and tag it with a message code
    pub fn parse_with_code(&self, code: &str, template: &str) -> Result<Arc<Message>, MessageParserError> {
        let message = self.parse(template).map_err(|e| e.with_code(code))?;
        Ok(self.normalizer.normalize_message(Arc::new(Message::with_code(code, message))))
    }

    /// Parse localized templates into locale variants, tagged with `code` if given.
    /// Without any template the message is empty.
    pub fn parse_locales(
        &self,
        code: Option<&str>,
        templates: &[(Locale, &str)],
    ) -> Result<Arc<Message>, MessageParserError> {
        let mut variants = Vec::with_capacity(templates.len());

        for (locale, template) in templates {
            let message = self.parse(template).map_err(|e| {
                let e = e.with_locale(locale.clone());
                match code {
                    Some(code) => e.with_code(code),
                    None => e,
                }
            })?;
            variants.push((locale.clone(), message));
        }

        let message = match Message::locale_variants(variants) {
            Some(message) => Arc::new(message),
            None => Arc::new(Message::Empty),
        };
        let message = match code {
            Some(code) => Arc::new(Message::with_code(code, message)),
            None => message,
        };

        Ok(self.normalizer.normalize_message(message))
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        MessageParser::new(Arc::new(NoOpNormalizer))
    }
}

struct ParseAst<'a> {
    file: ParseSourceFile,
    tokens: &'a [Token],
    index: usize,
    normalizer: &'a dyn MessagePartNormalizer,
}

impl<'a> ParseAst<'a> {
    fn new(input: &str, tokens: &'a [Token], normalizer: &'a dyn MessagePartNormalizer) -> Self {
        ParseAst {
            file: ParseSourceFile::new(input, ""),
            tokens,
            index: 0,
            normalizer,
        }
    }

    fn peek(&self) -> &'a Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &'a Token {
        let tokens = self.tokens;
        let last = tokens.len().saturating_sub(1);
        &tokens[(self.index + offset).min(last)]
    }

    fn next(&mut self) -> &'a Token {
        let token = self.peek();
        if !token.is_eof() {
            self.index += 1;
        }
        token
    }

    fn consume_optional(&mut self, token_type: TokenType) -> bool {
        if self.peek().is(token_type) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType, msg: &str) -> ParseResult<&'a Token> {
        let token = self.peek();
        if token.is(token_type) {
            Ok(self.next())
        } else {
            Err(self.error_at(token, msg))
        }
    }

    fn error_at(&self, token: &Token, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.file.span(token.index, token.end), msg)
    }

    fn parse_message(&mut self) -> ParseResult<Arc<Message>> {
        let mut parts = Vec::new();

        loop {
            let token = self.peek();
            match token.token_type {
                TokenType::Eof => break,
                TokenType::Text => {
                    self.next();
                    parts.push(MessagePart::text(&token.str_value, token.space_before, token.space_after));
                }
                TokenType::ParamStart => parts.push(self.parse_parameter()?),
                _ => return Err(self.error_at(token, "unexpected token")),
            }
        }

        let parts = MessagePart::fold_empty_text(parts)
            .into_iter()
            .map(|part| self.normalizer.normalize_part(part))
            .collect();

        Ok(self.normalizer.normalize_message(Arc::new(Message::from_parts(parts))))
    }

    fn parse_parameter(&mut self) -> ParseResult<MessagePart> {
        self.expect(TokenType::ParamStart, "parameter expected")?;

        let name_token = self.peek();
        let name = match name_token.token_type {
            TokenType::Name | TokenType::Bool | TokenType::Null | TokenType::Empty => {
                self.next();
                name_token.str_value.clone()
            }
            TokenType::ParamEnd | TokenType::Comma => {
                return Err(self.error_at(name_token, "missing parameter name"))
            }
            _ => return Err(self.error_at(name_token, "invalid parameter name")),
        };

        let mut parameter = ParameterPart::new(name);

        if self.consume_optional(TokenType::Comma) {
            let format = self.peek();
            if format.is(TokenType::Name)
                && matches!(self.peek_at(1).token_type, TokenType::Comma | TokenType::ParamEnd)
            {
                self.next();
                parameter = parameter.with_format(format.str_value.as_str());

                if self.consume_optional(TokenType::Comma) {
                    parameter = parameter.with_config(self.parse_config()?);
                }
            } else {
                parameter = parameter.with_config(self.parse_config()?);
            }
        }

        self.expect(TokenType::ParamEnd, "'}' expected")?;
        Ok(MessagePart::parameter(parameter))
    }

    fn parse_config(&mut self) -> ParseResult<ConfigMap> {
        let mut config = ConfigMap::new();

        if self.consume_optional(TokenType::MapStart) {
            self.parse_entries(&mut config, TokenType::MapEnd)?;
            self.expect(TokenType::MapEnd, "'}' expected")?;
        } else {
            self.parse_entries(&mut config, TokenType::ParamEnd)?;
        }

        Ok(config)
    }

    fn parse_entries(&mut self, config: &mut ConfigMap, end: TokenType) -> ParseResult<()> {
        loop {
            self.parse_entry(config)?;

            if !self.consume_optional(TokenType::Comma) || self.peek().is(end) {
                return Ok(());
            }
        }
    }

    fn parse_entry(&mut self, config: &mut ConfigMap) -> ParseResult<()> {
        let start = self.peek();

        if self.consume_optional(TokenType::Colon) {
            let value = self.parse_value()?;
            return config
                .set_default(value)
                .map_err(|e| self.error_at(start, e.to_string()));
        }

        if start.token_type.is_quote_start() && !self.peek_at(3).is(TokenType::Colon) {
            let value = self.parse_value()?;
            return config
                .set_default(value)
                .map_err(|e| self.error_at(start, e.to_string()));
        }

        let key = self.parse_key()?;
        self.expect(TokenType::Colon, "':' expected")?;
        let value = self.parse_value()?;

        config
            .insert(key, value)
            .map_err(|e| self.error_at(start, e.to_string()))
    }

    fn parse_key(&mut self) -> ParseResult<ConfigKey> {
        let op_token = self.peek();
        let compare = match op_token.token_type {
            TokenType::Eq => Some(CompareType::Eq),
            TokenType::Ne => Some(CompareType::Ne),
            TokenType::Lt => Some(CompareType::Lt),
            TokenType::Lte => Some(CompareType::Lte),
            TokenType::Gt => Some(CompareType::Gt),
            TokenType::Gte => Some(CompareType::Gte),
            _ => None,
        };
        if compare.is_some() {
            self.next();
        }

        let token = self.peek();
        let key = match token.token_type {
            TokenType::Number => {
                self.next();
                ConfigKey::Number(compare.unwrap_or(CompareType::Eq), token.num_value)
            }
            TokenType::SingleQuoteStart | TokenType::DoubleQuoteStart => {
                let (text, _) = self.parse_quoted()?;
                ConfigKey::String(compare.unwrap_or(CompareType::Eq), text)
            }
            TokenType::Null | TokenType::Empty => {
                let compare = compare.unwrap_or(CompareType::Eq);
                if !matches!(compare, CompareType::Eq | CompareType::Ne) {
                    return Err(self.error_at(op_token, format!("invalid comparator '{compare}' for {}", token.str_value)));
                }
                self.next();
                if token.is(TokenType::Null) {
                    ConfigKey::Null(compare)
                } else {
                    ConfigKey::Empty(compare)
                }
            }
            TokenType::Bool | TokenType::Name if compare.is_some() => {
                return Err(self.error_at(op_token, "comparator not allowed here"))
            }
            TokenType::Bool => {
                self.next();
                ConfigKey::Bool(token.to_bool().unwrap_or_default())
            }
            TokenType::Name => {
                self.next();
                ConfigKey::Name(token.str_value.clone())
            }
            _ => return Err(self.error_at(token, "missing config key")),
        };

        Ok(key)
    }

    fn parse_value(&mut self) -> ParseResult<ConfigValue> {
        let token = self.peek();
        let value = match token.token_type {
            TokenType::SingleQuoteStart | TokenType::DoubleQuoteStart => {
                let (text, raw) = self.parse_quoted()?;
                ConfigValue::String(StringValue::from_parts(raw, text))
            }
            TokenType::Number => {
                self.next();
                ConfigValue::Number(token.num_value)
            }
            TokenType::Bool => {
                self.next();
                ConfigValue::Bool(token.to_bool().unwrap_or_default())
            }
            TokenType::Name | TokenType::Null | TokenType::Empty => {
                self.next();
                ConfigValue::String(StringValue::new(&token.str_value))
            }
            _ => return Err(self.error_at(token, "missing config value")),
        };

        Ok(value)
    }

    /// Returns the unescaped text and its source form.
    fn parse_quoted(&mut self) -> ParseResult<(String, String)> {
        let start = self.next();
        let text = self.expect(TokenType::QuotedText, "quoted text expected")?;
        let end = self.next();

        if !end.token_type.is_quote_end() {
            return Err(self.error_at(start, "quoted text not properly ended"));
        }

        Ok((text.str_value.clone(), text.raw.clone()))
    }
}
