/**
 * Message Template Lexer
 *
 * Tokenizes message templates. Plain text, parameter and map contents are
 * scanned in separate lexical modes.
 */

use serde::{Deserialize, Serialize};

use crate::chars;
use crate::parse_util::{ParseError, ParseSourceFile};

/// Token types of a message template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Text = 0,
    ParamStart = 1,
    ParamEnd = 2,
    Comma = 3,
    Colon = 4,
    MapStart = 5,
    MapEnd = 6,
    SingleQuoteStart = 7,
    SingleQuoteEnd = 8,
    DoubleQuoteStart = 9,
    DoubleQuoteEnd = 10,
    QuotedText = 11,
    Name = 12,
    Number = 13,
    Bool = 14,
    Null = 15,
    Empty = 16,
    Eq = 17,
    Ne = 18,
    Lt = 19,
    Lte = 20,
    Gt = 21,
    Gte = 22,
    Eof = 23,
}

impl TokenType {
    pub fn is_quote_start(self) -> bool {
        matches!(self, TokenType::SingleQuoteStart | TokenType::DoubleQuoteStart)
    }

    pub fn is_quote_end(self) -> bool {
        matches!(self, TokenType::SingleQuoteEnd | TokenType::DoubleQuoteEnd)
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenType::Eq
                | TokenType::Ne
                | TokenType::Lt
                | TokenType::Lte
                | TokenType::Gt
                | TokenType::Gte
        )
    }
}

/// Token representation. `index` and `end` are character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: i64,
    pub str_value: String,
    /// Source form of quoted text, escapes kept
    pub raw: String,
    pub space_before: bool,
    pub space_after: bool,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, str_value: impl Into<String>) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value: 0,
            str_value: str_value.into(),
            raw: String::new(),
            space_before: false,
            space_after: false,
        }
    }

    pub fn text(index: usize, end: usize, text: String, space_before: bool, space_after: bool) -> Self {
        Token {
            space_before,
            space_after,
            ..Token::new(index, end, TokenType::Text, text)
        }
    }

    pub fn number(index: usize, end: usize, source: String, n: i64) -> Self {
        Token {
            num_value: n,
            ..Token::new(index, end, TokenType::Number, source)
        }
    }

    pub fn quoted(index: usize, end: usize, text: String, raw: String) -> Self {
        Token {
            raw,
            ..Token::new(index, end, TokenType::QuotedText, text)
        }
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    pub fn to_bool(&self) -> Option<bool> {
        if self.token_type == TokenType::Bool {
            Some(self.num_value != 0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerMode {
    Text,
    Parameter,
    Map,
}

/// Message template lexer
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    /// Tokenizes the whole template; the last token is always `Eof`.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, ParseError> {
        Scanner::new(text).scan()
    }
}

struct Scanner {
    file: ParseSourceFile,
    input: Vec<char>,
    index: usize,
    modes: Vec<LexerMode>,
    param_start: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Scanner {
            file: ParseSourceFile::new(input, ""),
            input: input.chars().collect(),
            index: 0,
            modes: vec![LexerMode::Text],
            param_start: 0,
            tokens: Vec::new(),
        }
    }

    fn scan(mut self) -> Result<Vec<Token>, ParseError> {
        while self.index < self.input.len() {
            let token = match self.mode() {
                LexerMode::Text => self.scan_text()?,
                LexerMode::Parameter | LexerMode::Map => match self.scan_parameter_token()? {
                    Some(token) => token,
                    None => break,
                },
            };
            self.tokens.push(token);
        }

        if self.mode() != LexerMode::Text {
            return Err(self.error(self.param_start, self.input.len(), "unexpected end of message; missing '}'"));
        }

        let end = self.input.len();
        self.tokens.push(Token::new(end, end, TokenType::Eof, ""));
        Ok(self.tokens)
    }

    fn mode(&self) -> LexerMode {
        self.modes.last().copied().unwrap_or(LexerMode::Text)
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.input.get(self.index + offset).copied().unwrap_or(chars::EOF)
    }

    fn at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn error(&self, start: usize, end: usize, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.file.span(start, end), msg)
    }

    fn scan_text(&mut self) -> Result<Token, ParseError> {
        let start = self.index;

        if self.peek() == chars::PERCENT && self.peek_at(1) == chars::LBRACE {
            self.index += 2;
            self.param_start = start;
            self.modes.push(LexerMode::Parameter);
            return Ok(Token::new(start, self.index, TokenType::ParamStart, "%{"));
        }

        let mut text = String::new();
        let mut space_before = false;
        let mut pending_space = false;

        while !self.at_end() {
            let ch = self.peek();

            if ch == chars::PERCENT && self.peek_at(1) == chars::LBRACE {
                break;
            }

            if chars::is_whitespace(ch) {
                if text.is_empty() {
                    space_before = true;
                } else {
                    pending_space = true;
                }
                self.advance();
                continue;
            }

            if pending_space {
                text.push(chars::SPACE);
                pending_space = false;
            }

            if ch == chars::BACKSLASH {
                text.push(self.scan_escape()?);
            } else {
                text.push(ch);
                self.advance();
            }
        }

        let space_after = if text.is_empty() { space_before } else { pending_space };
        Ok(Token::text(start, self.index, text, space_before, space_after))
    }

    /// Resolves `\X` and `\uXXXX`; the scanner stands on the backslash.
    fn scan_escape(&mut self) -> Result<char, ParseError> {
        let start = self.index;
        self.advance();

        if self.at_end() {
            return Err(self.error(start, self.index, "incomplete escape sequence"));
        }

        let ch = self.peek();
        self.advance();

        if ch != chars::u {
            return Ok(ch);
        }

        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self.peek().to_digit(16);
            match digit {
                Some(d) if !self.at_end() => {
                    code = code * 16 + d;
                    self.advance();
                }
                _ => return Err(self.error(start, self.index, "invalid unicode escape")),
            }
        }

        char::from_u32(code).ok_or_else(|| self.error(start, self.index, "invalid unicode escape"))
    }

    fn scan_parameter_token(&mut self) -> Result<Option<Token>, ParseError> {
        while !self.at_end() && chars::is_whitespace(self.peek()) {
            self.advance();
        }

        if self.at_end() {
            return Ok(None);
        }

        let start = self.index;
        let ch = self.peek();

        let single = |scanner: &mut Scanner, token_type: TokenType| {
            scanner.advance();
            Token::new(start, scanner.index, token_type, ch.to_string())
        };

        let token = match ch {
            chars::RBRACE => {
                let token_type = match self.modes.pop() {
                    Some(LexerMode::Map) => TokenType::MapEnd,
                    _ => TokenType::ParamEnd,
                };
                single(self, token_type)
            }
            chars::LBRACE => {
                self.modes.push(LexerMode::Map);
                single(self, TokenType::MapStart)
            }
            chars::COMMA => single(self, TokenType::Comma),
            chars::COLON => single(self, TokenType::Colon),
            chars::SQ | chars::DQ => return self.scan_quoted().map(Some),
            chars::EQ => single(self, TokenType::Eq),
            chars::BANG => single(self, TokenType::Ne),
            chars::LT => self.scan_operator(start),
            chars::GT => self.scan_operator(start),
            _ if chars::is_digit(ch) || (ch == chars::MINUS && chars::is_digit(self.peek_at(1))) => {
                self.scan_number(start)?
            }
            _ if chars::is_name_start(ch) => self.scan_name(start),
            _ => return Err(self.error(start, start + 1, format!("unexpected character '{ch}'"))),
        };

        Ok(Some(token))
    }

    fn scan_operator(&mut self, start: usize) -> Token {
        let first = self.peek();
        self.advance();
        let second = self.peek();

        let (token_type, two_chars) = match (first, second) {
            (chars::LT, chars::GT) => (TokenType::Ne, true),
            (chars::LT, chars::EQ) => (TokenType::Lte, true),
            (chars::LT, _) => (TokenType::Lt, false),
            (_, chars::EQ) => (TokenType::Gte, true),
            _ => (TokenType::Gt, false),
        };

        if two_chars {
            self.advance();
        }

        let source: String = self.input[start..self.index].iter().collect();
        Token::new(start, self.index, token_type, source)
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, ParseError> {
        if self.peek() == chars::MINUS {
            self.advance();
        }
        while chars::is_digit(self.peek()) {
            self.advance();
        }

        let source: String = self.input[start..self.index].iter().collect();
        let n = source
            .parse::<i64>()
            .map_err(|_| self.error(start, self.index, "number out of range"))?;

        Ok(Token::number(start, self.index, source, n))
    }

    fn scan_name(&mut self, start: usize) -> Token {
        while !self.at_end() && chars::is_name_part(self.peek()) {
            self.advance();
        }

        let name: String = self.input[start..self.index].iter().collect();

        if name.eq_ignore_ascii_case("true") || name.eq_ignore_ascii_case("false") {
            let value = name.eq_ignore_ascii_case("true");
            return Token {
                num_value: i64::from(value),
                ..Token::new(start, self.index, TokenType::Bool, name)
            };
        }

        let token_type = match name.as_str() {
            "null" => TokenType::Null,
            "empty" => TokenType::Empty,
            _ => TokenType::Name,
        };
        Token::new(start, self.index, token_type, name)
    }

    /// Emits start quote, quoted text and end quote; the text token is returned
    /// after the start quote has been pushed.
    fn scan_quoted(&mut self) -> Result<Token, ParseError> {
        let quote_start = self.index;
        let quote = self.peek();
        let (start_type, end_type) = if quote == chars::SQ {
            (TokenType::SingleQuoteStart, TokenType::SingleQuoteEnd)
        } else {
            (TokenType::DoubleQuoteStart, TokenType::DoubleQuoteEnd)
        };

        self.advance();
        self.tokens.push(Token::new(quote_start, self.index, start_type, quote.to_string()));

        let content_start = self.index;
        let mut text = String::new();

        loop {
            if self.at_end() {
                return Err(self.error(quote_start, self.index, "quoted text not properly ended"));
            }

            let ch = self.peek();
            if ch == quote {
                break;
            }

            if ch == chars::BACKSLASH {
                text.push(self.scan_escape()?);
            } else {
                text.push(ch);
                self.advance();
            }
        }

        let content_end = self.index;
        let raw: String = self.input[content_start..content_end].iter().collect();
        self.tokens.push(Token::quoted(content_start, content_end, text, raw));

        self.advance();
        Ok(Token::new(content_end, self.index, end_type, quote.to_string()))
    }
}

/// Escapes the characters with a meaning inside quoted template text.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, chars::BACKSLASH | chars::SQ | chars::DQ | chars::PERCENT) {
            escaped.push(chars::BACKSLASH);
        }
        escaped.push(ch);
    }
    escaped
}

/// Escapes literal text so it reads back as text outside of parameters.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut it = text.chars().peekable();
    while let Some(ch) = it.next() {
        if ch == chars::BACKSLASH || (ch == chars::PERCENT && it.peek() == Some(&chars::LBRACE)) {
            escaped.push(chars::BACKSLASH);
        }
        escaped.push(ch);
    }
    escaped
}

/// Resolves escape sequences. Malformed sequences are kept as written.
pub fn unescape(source: &str) -> String {
    let input: Vec<char> = source.chars().collect();
    let mut text = String::with_capacity(source.len());
    let mut i = 0;

    while i < input.len() {
        let ch = input[i];
        if ch != chars::BACKSLASH || i + 1 == input.len() {
            text.push(ch);
            i += 1;
            continue;
        }

        let next = input[i + 1];
        if next == chars::u {
            let code: String = input.iter().skip(i + 2).take(4).collect();
            let decoded = if code.chars().count() == 4 {
                u32::from_str_radix(&code, 16).ok().and_then(char::from_u32)
            } else {
                None
            };
            if let Some(decoded) = decoded {
                text.push(decoded);
                i += 6;
                continue;
            }
        }

        text.push(next);
        i += 2;
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        Lexer::new()
            .tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_text_only() {
        let tokens = Lexer::new().tokenize("  Hello   world ").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].str_value, "Hello world");
        assert!(tokens[0].space_before);
        assert!(tokens[0].space_after);
        assert!(tokens[1].is_eof());
    }

    #[test]
    fn test_parameter_tokens() {
        use TokenType::*;
        assert_eq!(
            types("a %{n,choice,1:'one',:\"many\"}"),
            vec![
                Text, ParamStart, Name, Comma, Name, Comma, Number, Colon, SingleQuoteStart,
                QuotedText, SingleQuoteEnd, Comma, Colon, DoubleQuoteStart, QuotedText,
                DoubleQuoteEnd, ParamEnd, Eof
            ]
        );
    }

    #[test]
    fn test_operators_and_keywords() {
        use TokenType::*;
        assert_eq!(
            types("%{x,<>null:1,<=-5:2,>=3:3,<empty:4,TRUE:5,!4:6}"),
            vec![
                ParamStart, Name, Comma, Ne, Null, Colon, Number, Comma, Lte, Number, Colon,
                Number, Comma, Gte, Number, Colon, Number, Comma, Lt, Empty, Colon, Number,
                Comma, Bool, Colon, Number, Comma, Ne, Number, Colon, Number, ParamEnd, Eof
            ]
        );
    }

    #[test]
    fn test_map_mode() {
        use TokenType::*;
        assert_eq!(
            types("%{x,{1:'a'}}"),
            vec![
                ParamStart, Name, Comma, MapStart, Number, Colon, SingleQuoteStart, QuotedText,
                SingleQuoteEnd, MapEnd, ParamEnd, Eof
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let tokens = Lexer::new().tokenize("100\\% \\u0041\\%{x}").unwrap();
        assert_eq!(tokens[0].str_value, "100% A%{x}");
    }

    #[test]
    fn test_quoted_keeps_raw_source() {
        let tokens = Lexer::new().tokenize("%{x,'it\\'s %{y}'}").unwrap();
        let quoted = tokens.iter().find(|t| t.is(TokenType::QuotedText)).unwrap();
        assert_eq!(quoted.str_value, "it's %{y}");
        assert_eq!(quoted.raw, "it\\'s %{y}");
    }

    #[test]
    fn test_number_value() {
        let tokens = Lexer::new().tokenize("%{x,-42:'n'}").unwrap();
        assert_eq!(tokens[3].num_value, -42);
    }

    #[test]
    fn test_errors() {
        let lexer = Lexer::new();
        assert_eq!(lexer.tokenize("%{x,'abc}").unwrap_err().msg, "quoted text not properly ended");
        assert_eq!(lexer.tokenize("abc\\").unwrap_err().msg, "incomplete escape sequence");
        assert_eq!(lexer.tokenize("\\u00zz").unwrap_err().msg, "invalid unicode escape");
        assert_eq!(lexer.tokenize("%{x").unwrap_err().msg, "unexpected end of message; missing '}'");
        assert_eq!(lexer.tokenize("%{x;}").unwrap_err().msg, "unexpected character ';'");
        assert_eq!(
            lexer.tokenize("%{x,99999999999999999999:'a'}").unwrap_err().msg,
            "number out of range"
        );

        let error = lexer.tokenize("ab %{x,'c").unwrap_err();
        assert_eq!(error.start(), 7);
    }

    #[test]
    fn test_escape_helpers() {
        assert_eq!(escape("a'b\"c%\\"), "a\\'b\\\"c\\%\\\\");
        assert_eq!(unescape("a\\'b\\u0041\\"), "a'bA\\");
        assert_eq!(unescape("\\uzz"), "uzz");
        assert_eq!(escape_text("50% %{x} \\"), "50% \\%{x} \\\\");
        assert_eq!(unescape(&escape("it's 100%")), "it's 100%");
    }
}
