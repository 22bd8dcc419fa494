/*
 * Character Codes
 *
 * Characters with a meaning in message templates
 */
#![allow(non_upper_case_globals)]

//! Character constants used by the lexer and the text helpers

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const PERCENT: char = '%';
pub const SQ: char = '\'';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const COLON: char = ':';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const BACKSLASH: char = '\\';
pub const UNDERSCORE: char = '_';

// Braces
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

pub const u: char = 'u';

// Digits
pub const ZERO: char = '0';
pub const NINE: char = '9';

/// Check if character is whitespace inside a template
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == LF || ch == CR || ch == NBSP || ch.is_whitespace()
}

/// Check if character is a space character (line breaks excluded)
pub fn is_space_char(ch: char) -> bool {
    ch != LF && ch != CR && is_whitespace(ch)
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    (ZERO..=NINE).contains(&ch)
}

/// Check if character can start a name
pub fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic()
}

/// Check if character can be part of a name
pub fn is_name_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == MINUS || ch == UNDERSCORE
}

/// Returns `s` without leading and trailing space characters. Line breaks are kept.
pub fn trim_spaces(s: &str) -> &str {
    s.trim_matches(is_space_char)
}

/// Tells whether `s` is empty or consists of space characters only.
pub fn is_trimmed_empty(s: &str) -> bool {
    s.chars().all(is_space_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_whitespace() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\n'));
        assert!(is_whitespace('\u{00A0}'));
        assert!(!is_whitespace('a'));
    }

    #[test]
    fn test_is_space_char() {
        assert!(is_space_char(' '));
        assert!(is_space_char('\u{2003}'));
        assert!(!is_space_char('\n'));
        assert!(!is_space_char('x'));
    }

    #[test]
    fn test_name_chars() {
        assert!(is_name_start('a'));
        assert!(is_name_start('Ä'));
        assert!(!is_name_start('1'));
        assert!(!is_name_start('-'));
        assert!(is_name_part('-'));
        assert!(is_name_part('_'));
        assert!(is_name_part('9'));
        assert!(!is_name_part(':'));
    }

    #[test]
    fn test_trim_spaces() {
        assert_eq!(trim_spaces("  abc \u{00A0}"), "abc");
        assert_eq!(trim_spaces("\nabc\n"), "\nabc\n");
        assert!(is_trimmed_empty("   "));
        assert!(is_trimmed_empty(""));
        assert!(!is_trimmed_empty(" x "));
    }
}
