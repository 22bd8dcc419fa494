//! Formatted text with space flags and the joiner that glues text fragments
//! together with at most one separating space.

use std::fmt;

use crate::chars;

/// Formatted text. Leading and trailing spaces are kept as flags, not as characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    text: String,
    space_before: bool,
    space_after: bool,
}

impl Text {
    pub fn new(text: impl Into<String>, space_before: bool, space_after: bool) -> Self {
        Text {
            text: text.into(),
            space_before,
            space_after,
        }
    }

    /// Text without space flags; surrounding spaces are dropped.
    pub fn no_space(text: &str) -> Self {
        Text::new(chars::trim_spaces(text), false, false)
    }

    /// Text with space flags taken from its surrounding spaces.
    pub fn spaced(text: &str) -> Self {
        let trimmed = chars::trim_spaces(text);
        if trimmed.is_empty() {
            let spaced = !text.is_empty();
            return Text::new("", spaced, spaced);
        }

        Text::new(
            trimmed,
            text.starts_with(chars::is_space_char),
            text.ends_with(chars::is_space_char),
        )
    }

    pub fn empty() -> Self {
        Text::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn space_before(&self) -> bool {
        self.space_before
    }

    pub fn space_after(&self) -> bool {
        self.space_after
    }

    /// Adds the given space flags to the ones already present.
    pub fn with_spaces(mut self, space_before: bool, space_after: bool) -> Self {
        self.space_before |= space_before;
        self.space_after |= space_after;
        self
    }

    /// Text with a single space for each flag
    pub fn text_with_spaces(&self) -> String {
        let mut s = String::with_capacity(self.text.len() + 2);
        if self.space_before {
            s.push(chars::SPACE);
        }
        s.push_str(&self.text);
        if self.space_after {
            s.push(chars::SPACE);
        }
        s
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Joins text fragments, inserting one space between two non-empty fragments
/// when either side asks for it.
#[derive(Debug, Default)]
pub struct TextJoiner {
    joined: String,
    insert_space_before: bool,
}

impl TextJoiner {
    pub fn new() -> Self {
        TextJoiner::default()
    }

    pub fn add(&mut self, text: &Text) -> &mut Self {
        self.insert_space_before |= text.space_before;

        if text.is_empty() {
            self.insert_space_before |= text.space_after;
        } else {
            if self.insert_space_before {
                self.joined.push(chars::SPACE);
            }
            self.joined.push_str(&text.text);
            self.insert_space_before = text.space_after;
        }

        self
    }

    /// Add a string dropping its surrounding spaces.
    pub fn add_no_space(&mut self, text: &str) -> &mut Self {
        self.add(&Text::no_space(text))
    }

    /// Add a string respecting its surrounding spaces.
    pub fn add_with_space(&mut self, text: &str) -> &mut Self {
        self.add(&Text::spaced(text))
    }

    /// The joined text keeping leading and trailing space flags.
    pub fn as_spaced_text(&self) -> Text {
        Text::spaced(&self.joined).with_spaces(false, self.insert_space_before)
    }

    /// The joined text without surrounding spaces.
    pub fn as_no_space_text(&self) -> Text {
        Text::no_space(&self.joined)
    }
}
