//! Identifier normalization
//!
//! Schema names are used both as generated symbol names and as lookup keys in
//! the generated dispatch code, so every function here is pure.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Letter prepended when a normalized name would not be an exported identifier
pub const EXPORT_SENTINEL: char = 'E';

/// Convert an arbitrary schema name into an exported identifier
///
/// Runs of letters and decimal digits form words; any other character
/// separates words. The first character of each word is upper-cased and the
/// rest is kept as-is. A word matching an entry of `force_cases`
/// case-insensitively takes that entry's exact spelling, e.g. `id` becomes
/// `ID` when `"ID"` is listed.
pub fn to_exported_identifier(raw: &str, force_cases: &[String]) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut starts_word = true;

    for c in raw.chars() {
        if !is_word_char(c) {
            starts_word = true;
            continue;
        }
        if starts_word {
            words.push(simple_upper(c).to_string());
            starts_word = false;
        } else if let Some(word) = words.last_mut() {
            word.push(c);
        }
    }

    let mut result = String::with_capacity(raw.len() + 1);
    for word in &words {
        match force_cases.iter().find(|forced| equal_fold(forced, word)) {
            Some(forced) => result.push_str(forced),
            None => result.push_str(word),
        }
    }

    if !result.chars().next().is_some_and(char::is_uppercase) {
        result.insert(0, EXPORT_SENTINEL);
    }
    result
}

fn is_word_char(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
    )
}

/// Single-character upper-case mapping; characters whose upper case spans
/// several characters (`ß`) are kept.
fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn simple_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-insensitive comparison under simple Unicode case folding
fn equal_fold(a: &str, b: &str) -> bool {
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if x != y
                    && simple_lower(x) != simple_lower(y)
                    && simple_upper(x) != simple_upper(y)
                {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Make a free-form name usable as a raw identifier (package or file name)
///
/// Every character other than an ASCII letter, digit or `_` becomes `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
