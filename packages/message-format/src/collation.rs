//! String collation
//!
//! Orders strings the way people read them rather than by code point. Strings
//! are compared on three levels: base letters ignoring accents and case, then
//! accents, then case with lowercase first.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Collation order of `a` relative to `b`.
pub fn compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| case_marks(a).cmp(case_marks(b)))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

// false sorts first, so lowercase precedes uppercase
fn case_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_before_case() {
        assert_eq!(compare("a", "B"), Ordering::Less);
        assert_eq!(compare("B", "a"), Ordering::Greater);
        assert_eq!(compare("apple", "Banana"), Ordering::Less);
        assert_eq!(compare("Zoo", "zebra"), Ordering::Greater);
    }

    #[test]
    fn test_case_tiebreak() {
        assert_eq!(compare("abc", "abc"), Ordering::Equal);
        assert_eq!(compare("abc", "Abc"), Ordering::Less);
        assert_eq!(compare("ABC", "abc"), Ordering::Greater);
    }

    #[test]
    fn test_accents() {
        assert_eq!(compare("e", "\u{e9}"), Ordering::Less);
        assert_eq!(compare("\u{e9}", "f"), Ordering::Less);
        assert_eq!(compare("r\u{e9}sum\u{e9}", "resume"), Ordering::Greater);
        assert_eq!(compare("\u{e9}", "e\u{301}"), Ordering::Equal);
    }

    #[test]
    fn test_prefixes_and_digits() {
        assert_eq!(compare("ab", "abc"), Ordering::Less);
        assert_eq!(compare("", "a"), Ordering::Less);
        assert_eq!(compare("10", "9"), Ordering::Less);
        assert_eq!(compare("9", "a"), Ordering::Less);
    }
}
