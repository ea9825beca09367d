//! Pole identifier normalization and match-key extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Two letters, optional spaces/hyphens, then digits. Only counts when the
/// letters are not preceded by another letter (see [`prefixed_serials`]).
static PREFIX_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z]{2}[\s\-]*([0-9]+)").expect("prefix token pattern is valid"));

/// Lowercase, keep ASCII letters, digits and `-`. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Numeric match key for a raw pole id.
///
/// The digits of the last two-letter prefixed token win; otherwise all
/// digits in the id are concatenated. Leading zeros are dropped in both
/// cases (an all-zero key collapses to `"0"`). No digits yields `""`.
pub fn extract_numeric_key(raw: &str) -> String {
    let digits = match prefixed_serials(raw).last() {
        Some(serial) => serial.to_string(),
        None => raw.chars().filter(char::is_ascii_digit).collect(),
    };
    strip_leading_zeros(&digits)
}

/// Digit runs of every prefixed token, in order. The `PL` in `1234-PL56`
/// and `SC12PL34` counts; the `le` in `Pole 12` does not.
fn prefixed_serials(raw: &str) -> impl Iterator<Item = &str> {
    PREFIX_TOKEN.captures_iter(raw).filter_map(move |caps| {
        let token = caps.get(0)?;
        let after_letter = raw.as_bytes()[..token.start()].last().is_some_and(u8::is_ascii_alphabetic);
        if after_letter {
            return None;
        }
        caps.get(1).map(|m| m.as_str())
    })
}

fn strip_leading_zeros(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Station label without its leading `<digits>-` job prefix.
pub fn strip_station_prefix(label: &str) -> &str {
    let digits = label.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && label.as_bytes().get(digits) == Some(&b'-') {
        &label[digits + 1..]
    } else {
        label
    }
}
