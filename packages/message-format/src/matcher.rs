//! Key matching
//!
//! Ranks how well a runtime value matches the keys of a parameter's config map
//! and selects the value of the best matching entry.

use std::cmp::Ordering;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::chars;
use crate::collation;
use crate::locale::Locale;
use crate::message::{ConfigKey, ConfigMap, ConfigValue};
use crate::value::Value;

/// Strength of a key match, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchResult {
    Mismatch,
    Lenient,
    Equivalent,
    Exact,
}

impl MatchResult {
    pub fn is_match(self) -> bool {
        self != MatchResult::Mismatch
    }
}

/// Comparator of a config key. The declaration order is the packed ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompareType {
    Lt,
    Lte,
    Eq,
    Ne,
    Gt,
    Gte,
}

impl CompareType {
    pub const ALL: [CompareType; 6] = [
        CompareType::Lt,
        CompareType::Lte,
        CompareType::Eq,
        CompareType::Ne,
        CompareType::Gt,
        CompareType::Gte,
    ];

    /// Tells whether `value <op> key` holds for the given ordering of value to key.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareType::Lt => ordering == Ordering::Less,
            CompareType::Lte => ordering != Ordering::Greater,
            CompareType::Eq => ordering == Ordering::Equal,
            CompareType::Ne => ordering != Ordering::Equal,
            CompareType::Gt => ordering == Ordering::Greater,
            CompareType::Gte => ordering != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareType::Lt => "<",
            CompareType::Lte => "<=",
            CompareType::Eq => "=",
            CompareType::Ne => "<>",
            CompareType::Gt => ">",
            CompareType::Gte => ">=",
        }
    }

    /// Symbol as written in front of a key; equality is implicit.
    pub fn as_prefix(self) -> &'static str {
        match self {
            CompareType::Eq => "",
            other => other.symbol(),
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        CompareType::ALL.get(usize::from(ordinal)).copied()
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

bitflags! {
    /// Key types taking part in a selection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyTypes: u8 {
        const BOOL = 0b0000_0001;
        const EMPTY = 0b0000_0010;
        const NAME = 0b0000_0100;
        const NULL = 0b0000_1000;
        const NUMBER = 0b0001_0000;
        const STRING = 0b0010_0000;

        const EMPTY_NULL = Self::EMPTY.bits() | Self::NULL.bits();
        const NO_NAME = Self::BOOL.bits()
            | Self::EMPTY.bits()
            | Self::NULL.bits()
            | Self::NUMBER.bits()
            | Self::STRING.bits();
    }
}

/// What key matching needs from its surroundings.
pub trait MatchContext {
    fn locale(&self) -> &Locale;

    /// How well `value` matches an `empty` key with the given comparator.
    fn match_empty(&self, compare: CompareType, value: &Value) -> MatchResult {
        default_match_empty(compare, value)
    }
}

/// Matches `value` against a single key.
pub fn match_key(key: &ConfigKey, value: &Value, ctx: &dyn MatchContext) -> MatchResult {
    match key {
        ConfigKey::Bool(key) => match_bool(*key, value, ctx.locale()),
        ConfigKey::Number(compare, number) => match_number(*compare, *number, value, ctx.locale()),
        ConfigKey::String(compare, string) => match_string(*compare, string, value),
        ConfigKey::Name(name) => match value {
            Value::String(s) if s == name => MatchResult::Exact,
            _ => MatchResult::Mismatch,
        },
        ConfigKey::Null(compare) => match_null(*compare, value),
        ConfigKey::Empty(compare) => match value {
            Value::Null if *compare == CompareType::Eq => MatchResult::Lenient,
            Value::Null => MatchResult::Mismatch,
            _ => ctx.match_empty(*compare, value),
        },
    }
}

/// Selects the value of the strongest matching entry among the keys of the
/// requested types. An exact match ends the search; ties keep the first entry.
/// Without any match the default entry is returned when `include_default` is set.
pub fn select<'m>(
    map: &'m ConfigMap,
    value: &Value,
    key_types: KeyTypes,
    ctx: &dyn MatchContext,
    include_default: bool,
) -> Option<&'m ConfigValue> {
    let mut best: Option<(&ConfigValue, MatchResult)> = None;

    for (key, config_value) in map.entries() {
        if !key_types.intersects(key.key_type()) {
            continue;
        }

        let result = match_key(key, value, ctx);
        if result == MatchResult::Exact {
            return Some(config_value);
        }

        if result.is_match() && best.map_or(true, |(_, strongest)| result > strongest) {
            best = Some((config_value, result));
        }
    }

    match best {
        Some((config_value, _)) => Some(config_value),
        None if include_default => map.default_value(),
        None => None,
    }
}

fn match_bool(key: bool, value: &Value, locale: &Locale) -> MatchResult {
    let lenient = |truthy: bool| {
        if truthy == key {
            MatchResult::Lenient
        } else {
            MatchResult::Mismatch
        }
    };

    match value {
        Value::Bool(b) if *b == key => MatchResult::Exact,
        Value::Bool(_) => MatchResult::Mismatch,
        Value::String(_) | Value::Char(_) => {
            let text = value.as_text().unwrap_or_default();
            let text = text.trim();

            if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
                if text.eq_ignore_ascii_case(if key { "true" } else { "false" }) {
                    MatchResult::Equivalent
                } else {
                    MatchResult::Mismatch
                }
            } else {
                parse_decimal(text, locale).map_or(MatchResult::Mismatch, |v| lenient(v != 0.0))
            }
        }
        _ => {
            if let Some(v) = value.as_i64() {
                lenient(v != 0)
            } else if let Some(v) = value.as_f64() {
                lenient(v != 0.0)
            } else {
                MatchResult::Mismatch
            }
        }
    }
}

fn match_number(compare: CompareType, number: i64, value: &Value, locale: &Locale) -> MatchResult {
    let (ordering, identical) = if let Some(v) = value.as_i64() {
        (v.cmp(&number), MatchResult::Exact)
    } else if let Some(v) = value.as_f64() {
        match v.partial_cmp(&(number as f64)) {
            Some(ordering) => (ordering, MatchResult::Exact),
            None => return MatchResult::Mismatch,
        }
    } else if let Some(text) = value.as_text() {
        match parse_decimal(text.trim(), locale).and_then(|v| v.partial_cmp(&(number as f64))) {
            Some(ordering) => (ordering, MatchResult::Lenient),
            None => return MatchResult::Mismatch,
        }
    } else {
        return MatchResult::Mismatch;
    };

    if !compare.matches(ordering) {
        MatchResult::Mismatch
    } else if ordering == Ordering::Equal {
        identical
    } else {
        MatchResult::Lenient
    }
}

fn match_string(compare: CompareType, string: &str, value: &Value) -> MatchResult {
    if value.is_null() {
        return MatchResult::Mismatch;
    }

    let (text, result) = match value.as_text() {
        Some(text) => (text.into_owned(), MatchResult::Exact),
        None => (value.to_string(), MatchResult::Equivalent),
    };

    let same_ignoring_case = || text.to_lowercase() == string.to_lowercase();

    let (ordering, result) = match compare {
        CompareType::Eq if text == string => (Ordering::Equal, result),
        CompareType::Eq if same_ignoring_case() => (Ordering::Equal, MatchResult::Lenient),
        CompareType::Eq => (Ordering::Greater, result),
        CompareType::Ne if !same_ignoring_case() => (Ordering::Greater, MatchResult::Lenient),
        _ => (collation::compare(&text, string), result),
    };

    if compare.matches(ordering) {
        result
    } else {
        MatchResult::Mismatch
    }
}

fn match_null(compare: CompareType, value: &Value) -> MatchResult {
    let result = match value {
        Value::Null => MatchResult::Exact,
        Value::Optional(None) => MatchResult::Lenient,
        _ => MatchResult::Mismatch,
    };

    match compare {
        CompareType::Eq => result,
        _ if result.is_match() => MatchResult::Mismatch,
        _ => MatchResult::Exact,
    }
}

/// Empty matching for values whose formatter has no own notion of emptiness:
/// the empty string is exactly empty, a string of spaces leniently empty.
pub fn default_match_empty(compare: CompareType, value: &Value) -> MatchResult {
    let empty = match value.as_text() {
        Some(text) if text.is_empty() => MatchResult::Exact,
        Some(text) if chars::is_trimmed_empty(&text) => MatchResult::Lenient,
        Some(_) => MatchResult::Mismatch,
        None => {
            return if compare == CompareType::Eq {
                MatchResult::Mismatch
            } else {
                MatchResult::Lenient
            }
        }
    };

    match compare {
        CompareType::Eq => empty,
        _ if empty.is_match() => MatchResult::Mismatch,
        _ => MatchResult::Exact,
    }
}

/// Empty matching by size, for collections.
pub fn match_empty_size(compare: CompareType, size: usize) -> MatchResult {
    let empty = size == 0;
    match compare {
        CompareType::Eq if empty => MatchResult::Exact,
        CompareType::Eq => MatchResult::Mismatch,
        _ if empty => MatchResult::Mismatch,
        _ => MatchResult::Exact,
    }
}

/// Parses a decimal number written with the locale's decimal separator.
pub fn parse_decimal(text: &str, locale: &Locale) -> Option<f64> {
    let separator = locale.decimal_separator();
    let mut digits = false;

    let normalized: String = text
        .chars()
        .map(|ch| {
            digits |= chars::is_digit(ch);
            if ch == separator {
                chars::PERIOD
            } else {
                ch
            }
        })
        .collect();

    let valid = normalized
        .chars()
        .enumerate()
        .all(|(i, ch)| chars::is_digit(ch) || ch == chars::PERIOD || (i == 0 && (ch == '-' || ch == '+')));

    if digits && valid {
        normalized.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestContext(Locale);

    impl MatchContext for TestContext {
        fn locale(&self) -> &Locale {
            &self.0
        }
    }

    fn ctx() -> TestContext {
        TestContext(Locale::parse("en").unwrap())
    }

    fn matches(key: ConfigKey, value: impl Into<Value>) -> MatchResult {
        match_key(&key, &value.into(), &ctx())
    }

    #[test]
    fn test_bool_truth_table() {
        assert_eq!(matches(ConfigKey::Bool(true), 0_i8), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Bool(true), 100_i8), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Bool(true), "true"), MatchResult::Equivalent);
        assert_eq!(matches(ConfigKey::Bool(true), "TRUE"), MatchResult::Equivalent);
        assert_eq!(matches(ConfigKey::Bool(false), i64::MIN), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Bool(true), true), MatchResult::Exact);
        assert_eq!(matches(ConfigKey::Bool(false), true), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Bool(false), "0"), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Bool(true), '7'), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Bool(true), 0.5_f64), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Bool(true), "yes"), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Bool(true), vec![1]), MatchResult::Mismatch);
    }

    #[test]
    fn test_number_keys() {
        let eq5 = ConfigKey::Number(CompareType::Eq, 5);
        assert_eq!(matches(eq5.clone(), 5_i32), MatchResult::Exact);
        assert_eq!(matches(eq5.clone(), 6_i32), MatchResult::Mismatch);
        assert_eq!(matches(eq5.clone(), 5.0_f64), MatchResult::Exact);
        assert_eq!(matches(eq5.clone(), "5"), MatchResult::Lenient);
        assert_eq!(matches(eq5, true), MatchResult::Mismatch);

        let gt5 = ConfigKey::Number(CompareType::Gt, 5);
        assert_eq!(matches(gt5.clone(), 7_i64), MatchResult::Lenient);
        assert_eq!(matches(gt5.clone(), 5_i64), MatchResult::Mismatch);
        assert_eq!(matches(gt5, f64::NAN), MatchResult::Mismatch);

        let lte5 = ConfigKey::Number(CompareType::Lte, 5);
        assert_eq!(matches(lte5.clone(), 5_i8), MatchResult::Exact);
        assert_eq!(matches(lte5, -3_i8), MatchResult::Lenient);
    }

    #[test]
    fn test_number_locale_parsing() {
        let key = ConfigKey::Number(CompareType::Gt, 1);
        let german = TestContext(Locale::parse("de").unwrap());
        assert_eq!(match_key(&key, &Value::from("1,5"), &german), MatchResult::Lenient);
        assert_eq!(match_key(&key, &Value::from("1,5"), &ctx()), MatchResult::Mismatch);
    }

    #[test]
    fn test_string_keys() {
        let key = ConfigKey::String(CompareType::Eq, "abc".to_string());
        assert_eq!(matches(key.clone(), "abc"), MatchResult::Exact);
        assert_eq!(matches(key.clone(), "ABC"), MatchResult::Lenient);
        assert_eq!(matches(key.clone(), "abd"), MatchResult::Mismatch);
        assert_eq!(matches(key, Value::Null), MatchResult::Mismatch);

        let number = ConfigKey::String(CompareType::Eq, "12".to_string());
        assert_eq!(matches(number, 12_i32), MatchResult::Equivalent);

        let ne = ConfigKey::String(CompareType::Ne, "abc".to_string());
        assert_eq!(matches(ne.clone(), "xyz"), MatchResult::Lenient);
        assert_eq!(matches(ne.clone(), "ABC"), MatchResult::Exact);
        assert_eq!(matches(ne, "abc"), MatchResult::Mismatch);

        let lt = ConfigKey::String(CompareType::Lt, "m".to_string());
        assert_eq!(matches(lt.clone(), "a"), MatchResult::Exact);
        assert_eq!(matches(lt, "z"), MatchResult::Mismatch);
    }

    #[test]
    fn test_null_and_empty_keys() {
        assert_eq!(matches(ConfigKey::Null(CompareType::Eq), Value::Null), MatchResult::Exact);
        assert_eq!(matches(ConfigKey::Null(CompareType::Eq), None::<i32>), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Null(CompareType::Ne), Value::Null), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Null(CompareType::Ne), 1_i32), MatchResult::Exact);

        assert_eq!(matches(ConfigKey::Empty(CompareType::Eq), ""), MatchResult::Exact);
        assert_eq!(matches(ConfigKey::Empty(CompareType::Eq), "  "), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Empty(CompareType::Eq), Value::Null), MatchResult::Lenient);
        assert_eq!(matches(ConfigKey::Empty(CompareType::Eq), "x"), MatchResult::Mismatch);
        assert_eq!(matches(ConfigKey::Empty(CompareType::Ne), "x"), MatchResult::Exact);
        assert_eq!(matches(ConfigKey::Empty(CompareType::Ne), ""), MatchResult::Mismatch);
    }

    #[test]
    fn test_name_key() {
        let key = ConfigKey::Name("clip-size".to_string());
        assert_eq!(matches(key.clone(), "clip-size"), MatchResult::Exact);
        assert_eq!(matches(key, 1_i32), MatchResult::Mismatch);
    }

    #[test]
    fn test_select_prefers_exact_over_lenient() {
        let mut map = ConfigMap::new();
        map.insert(ConfigKey::Bool(true), ConfigValue::from("yes")).unwrap();
        map.insert(ConfigKey::Bool(false), ConfigValue::from("no")).unwrap();

        let selected = select(&map, &Value::Bool(true), KeyTypes::BOOL, &ctx(), false);
        assert_eq!(selected, Some(&ConfigValue::from("yes")));

        let mut map = ConfigMap::new();
        map.insert(ConfigKey::Number(CompareType::Gt, 0), ConfigValue::from("positive")).unwrap();
        map.insert(ConfigKey::Number(CompareType::Eq, 7), ConfigValue::from("seven")).unwrap();
        let selected = select(&map, &Value::I32(7), KeyTypes::NUMBER, &ctx(), false);
        assert_eq!(selected, Some(&ConfigValue::from("seven")));
    }

    #[test]
    fn test_select_default_and_filter() {
        let mut map = ConfigMap::new();
        map.insert(ConfigKey::Number(CompareType::Eq, 1), ConfigValue::from("one")).unwrap();
        map.set_default(ConfigValue::from("many")).unwrap();

        assert_eq!(
            select(&map, &Value::I32(5), KeyTypes::NUMBER, &ctx(), true),
            Some(&ConfigValue::from("many"))
        );
        assert_eq!(select(&map, &Value::I32(5), KeyTypes::NUMBER, &ctx(), false), None);
        assert_eq!(select(&map, &Value::I32(1), KeyTypes::STRING, &ctx(), false), None);
    }

    #[test]
    fn test_compare_type() {
        assert!(CompareType::Lte.matches(Ordering::Equal));
        assert!(!CompareType::Lt.matches(Ordering::Equal));
        assert_eq!(CompareType::Eq.as_prefix(), "");
        assert_eq!(CompareType::Ne.as_prefix(), "<>");
        assert_eq!(CompareType::from_ordinal(5), Some(CompareType::Gte));
        assert_eq!(CompareType::from_ordinal(6), None);
        assert!(MatchResult::Exact > MatchResult::Equivalent);
        assert!(MatchResult::Lenient > MatchResult::Mismatch);
    }

    #[test]
    fn test_parse_decimal() {
        let en = Locale::parse("en").unwrap();
        assert_eq!(parse_decimal("-12.5", &en), Some(-12.5));
        assert_eq!(parse_decimal("inf", &en), None);
        assert_eq!(parse_decimal("", &en), None);
        assert_eq!(parse_decimal("1-2", &en), None);
    }
}
