//! String helpers backing the builtin normalizer catalog.
//!
//! Word splitting understands camelCase, PascalCase, acronyms (`HTTPServer` splits
//! into `HTTP` and `Server`) and the `_`, `-`, `.` and whitespace delimiters. Only
//! ASCII letters and digits form words; everything else acts as a delimiter.

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[vV]([0-9]+)").expect("static version pattern"));

static TRAILING_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)$").expect("static trailing digits pattern"));

/// Split text into words.
pub fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() {
            let run_end = run_end(&chars, i, |ch| ch.is_ascii_uppercase());
            let run_len = run_end - i;
            let followed_by_lower = chars.get(run_end).is_some_and(|ch| ch.is_ascii_lowercase());

            let end = if run_len >= 2 && followed_by_lower {
                // Acronym followed by a capitalised word: leave the last capital to the next word.
                run_end - 1
            } else if run_len == 1
                && chars
                    .get(i + 1)
                    .is_some_and(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
            {
                run_end_from(&chars, i + 1, |ch| {
                    ch.is_ascii_lowercase() || ch.is_ascii_digit()
                })
            } else {
                run_end
            };
            words.push(chars[i..end].iter().collect());
            i = end;
        } else if c.is_ascii_lowercase() {
            let end = run_end(&chars, i, |ch| ch.is_ascii_lowercase());
            words.push(chars[i..end].iter().collect());
            i = end;
        } else if c.is_ascii_digit() {
            let end = run_end(&chars, i, |ch| ch.is_ascii_digit());
            words.push(chars[i..end].iter().collect());
            i = end;
        } else {
            i += 1;
        }
    }

    words
}

fn run_end(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    run_end_from(chars, start, pred)
}

fn run_end_from(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

/// Uppercase the first character and lowercase the rest.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Convert text to camelCase (`"upper arm"` becomes `"upperArm"`).
pub fn to_camel_case(text: &str) -> String {
    settle(text, camel_once)
}

/// Convert text to PascalCase.
pub fn to_pascal_case(text: &str) -> String {
    settle(text, |t| split_words(t).iter().map(|w| capitalize_word(w)).collect())
}

/// Convert text to snake_case.
pub fn to_snake_case(text: &str) -> String {
    settle(text, |t| join_lower(t, "_"))
}

/// Convert text to kebab-case.
pub fn to_kebab_case(text: &str) -> String {
    settle(text, |t| join_lower(t, "-"))
}

/// Re-apply a conversion until its output stops changing.
///
/// Adjacent short words can re-split differently once joined (`"a B c"` gives
/// `"aBC"`, which splits as `a`, `BC`); the fixed point is idempotent.
fn settle(text: &str, convert: impl Fn(&str) -> String) -> String {
    let mut current = convert(text);
    for _ in 0..MAX_SETTLE_PASSES {
        let next = convert(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

const MAX_SETTLE_PASSES: usize = 8;

fn camel_once(text: &str) -> String {
    let words = split_words(text);
    let mut iter = words.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut result = first.to_lowercase();
    for word in iter {
        result.push_str(&capitalize_word(word));
    }
    result
}

fn join_lower(text: &str, delimiter: &str) -> String {
    split_words(text)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Remove every ASCII digit.
pub fn strip_digits(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Replace characters outside `[A-Za-z0-9_]` with `replace_with`, collapse runs of the
/// replacement and make sure the result does not start with a digit.
pub fn clean_text(text: &str, replace_with: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c);
        } else {
            cleaned.push_str(replace_with);
        }
    }

    if !replace_with.is_empty() {
        let doubled = replace_with.repeat(2);
        while cleaned.contains(&doubled) {
            cleaned = cleaned.replace(&doubled, replace_with);
        }
    }

    if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        cleaned.insert_str(0, replace_with);
    }
    cleaned
}

/// Drop everything up to and including the last `separator` (`"ns:arm"` becomes `"arm"`).
pub fn strip_namespace<'a>(text: &'a str, separator: &str) -> &'a str {
    text.rsplit_once(separator).map_or(text, |(_, leaf)| leaf)
}

/// Last component of a path-like string (`"|grp|arm"` becomes `"arm"`).
pub fn base_name<'a>(text: &'a str, separator: &str) -> &'a str {
    text.rsplit(separator).next().unwrap_or(text)
}

/// Extract the number following a `v`/`V` marker (`"v003"` yields `3`).
pub fn get_version(text: &str) -> Option<u64> {
    VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Split a trailing number off a name (`"arm01"` yields `("arm", Some("01"))`).
pub fn split_name_number(text: &str) -> (&str, Option<&str>) {
    match TRAILING_DIGITS_RE.find(text) {
        Some(m) => (&text[..m.start()], Some(m.as_str())),
        None => (text, None),
    }
}

/// Increment the trailing number, keeping its padding unless `pads` overrides it.
/// A name without a trailing number gets one appended (`"arm"` becomes `"arm01"`).
pub fn increment_digit(text: &str, pads: Option<usize>) -> String {
    match split_name_number(text) {
        (stem, Some(digits)) => {
            let padding = pads.unwrap_or(digits.len());
            let next = digits.parse::<u128>().map_or(1, |n| n.saturating_add(1));
            format!("{stem}{next:0padding$}")
        }
        (stem, None) => {
            let padding = pads.unwrap_or(2);
            format!("{stem}{:0padding$}", 1)
        }
    }
}

/// Decrement the trailing number. With `remove_if_one`, a number that would drop
/// to zero is removed entirely (`"arm01"` becomes `"arm"`).
pub fn decrement_digit(text: &str, remove_if_one: bool) -> String {
    let (stem, Some(digits)) = split_name_number(text) else {
        return text.to_string();
    };
    let Ok(value) = digits.parse::<u128>() else {
        return text.to_string();
    };

    if remove_if_one && value <= 1 {
        return stem.to_string();
    }
    if value == 0 {
        return text.to_string();
    }
    let width = digits.len();
    format!("{stem}{:0width$}", value - 1)
}
