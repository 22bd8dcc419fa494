//! Parse Utilities
//!
//! Source locations, spans and syntax errors reported by the lexer and parser.
//! Offsets are character offsets into the template source.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chars;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSourceFile {
    pub content: Arc<str>,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<Arc<str>>, url: impl Into<String>) -> Self {
        ParseSourceFile {
            content: content.into(),
            url: url.into(),
        }
    }

    /// Location of the character at `offset`, computing line and column.
    pub fn location(&self, offset: usize) -> ParseLocation {
        let mut line = 0;
        let mut col = 0;

        for ch in self.content.chars().take(offset) {
            if ch == chars::LF {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        ParseLocation { offset, line, col }
    }

    /// Span covering the characters `start..end`.
    pub fn span(&self, start: usize, end: usize) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(end.max(start)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseLocation {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    /// The covered source text
    pub fn text(&self, file: &ParseSourceFile) -> String {
        file.content
            .chars()
            .skip(self.start.offset)
            .take(self.end.offset.saturating_sub(self.start.offset))
            .collect()
    }
}

/// A syntax error at a span of the template source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
        }
    }

    pub fn start(&self) -> usize {
        self.span.start.offset
    }

    pub fn stop(&self) -> usize {
        self.span.end.offset
    }

    /// Return the source around the error start, up to `max_chars` on each side
    /// and never crossing more than one line break.
    pub fn context(&self, content: &str, max_chars: usize) -> (String, String) {
        let chars: Vec<char> = content.chars().collect();
        let offset = self.span.start.offset.min(chars.len());

        let mut start = offset;
        let mut lines = 0;
        while start > 0 && offset - start < max_chars {
            if chars[start - 1] == chars::LF {
                lines += 1;
                if lines > 1 {
                    break;
                }
            }
            start -= 1;
        }

        let mut end = offset;
        lines = 0;
        while end < chars.len() && end - offset < max_chars {
            if chars[end] == chars::LF {
                lines += 1;
                if lines > 1 {
                    break;
                }
            }
            end += 1;
        }

        (
            chars[start..offset].iter().collect(),
            chars[offset..end].iter().collect(),
        )
    }

    /// Error message with the marked source excerpt: `msg ("before[ERROR ->]after")`
    pub fn contextual_message(&self, content: &str) -> String {
        let (before, after) = self.context(content, 40);
        format!("{} (\"{}[ERROR ->]{}\")", self.msg, before, after)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.msg, self.span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_line_col() {
        let file = ParseSourceFile::new("ab\ncd", "test");
        let loc = file.location(4);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.col, 1);
        assert_eq!(loc.to_string(), "2:2");
    }

    #[test]
    fn test_span_text() {
        let file = ParseSourceFile::new("hello %{x}", "test");
        assert_eq!(file.span(6, 10).text(&file), "%{x}");
    }

    #[test]
    fn test_contextual_message() {
        let file = ParseSourceFile::new("text %{,}", "test");
        let err = ParseError::new(file.span(7, 8), "missing parameter name");
        assert_eq!(
            err.contextual_message(&file.content),
            "missing parameter name (\"text %{[ERROR ->],}\")"
        );
    }
}
