//! Prioritized extraction strategies.
//!
//! The analysis export has moved the same logical value between several
//! paths over its history. Each path is one named strategy; a field's
//! strategies are tried in order and the first hit wins. New schema
//! revisions are supported by adding a strategy to the front of a list.

use serde_json::Value;

pub struct Strategy<T> {
    pub name: &'static str,
    pub extract: fn(&Value) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(name: &'static str, extract: fn(&Value) -> Option<T>) -> Self {
        Self { name, extract }
    }
}

/// First strategy that yields a value, with its name.
pub fn first_match<T>(input: &Value, strategies: &[Strategy<T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|s| (s.extract)(input).map(|v| (s.name, v)))
}
