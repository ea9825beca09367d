//! Alias-driven field lookup.
//!
//! Both exports name their fields loosely: spreadsheet headers drift between
//! tool versions and JSON keys change case. Lookup walks an ordered alias
//! list in three tiers over the whole list: exact name, then
//! case-insensitive name, then a fuzzy containment match on a folded form.
//! Blank values never satisfy a lookup.

use serde_json::{Map, Value};

use crate::model::{CellValue, SourceRow};

/// Something that exposes named values.
pub trait Fields {
    type Value: ?Sized;

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &Self::Value)> + '_>;

    fn is_blank(value: &Self::Value) -> bool;
}

impl Fields for SourceRow {
    type Value = CellValue;

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &CellValue)> + '_> {
        Box::new(self.cells.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn is_blank(value: &CellValue) -> bool {
        value.is_blank()
    }
}

impl Fields for Map<String, Value> {
    type Value = Value;

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &Value)> + '_> {
        Box::new(self.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    Fuzzy,
}

#[derive(Debug)]
pub struct FieldHit<'a, V: ?Sized> {
    pub key: &'a str,
    pub value: &'a V,
    pub tier: MatchTier,
}

/// Shortest folded name allowed to take part in a fuzzy match.
const FUZZY_MIN_LEN: usize = 3;

/// Lowercase and drop whitespace, `_` and `-`.
pub fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn fuzzy_eq(key: &str, alias: &str) -> bool {
    let key = fold(key);
    let alias = fold(alias);
    let (short, long) = if key.len() <= alias.len() { (&key, &alias) } else { (&alias, &key) };
    short.len() >= FUZZY_MIN_LEN && long.contains(short.as_str())
}

fn tier_matches(tier: MatchTier, key: &str, alias: &str) -> bool {
    match tier {
        MatchTier::Exact => key == alias,
        MatchTier::CaseInsensitive => key.to_lowercase() == alias.to_lowercase(),
        MatchTier::Fuzzy => fuzzy_eq(key, alias),
    }
}

/// Resolve the first non-blank field named by `aliases`, trying tiers up to
/// and including `max_tier`.
pub fn resolve<'a, F, S>(fields: &'a F, aliases: &[S], max_tier: MatchTier) -> Option<FieldHit<'a, F::Value>>
where
    F: Fields + ?Sized,
    S: AsRef<str>,
{
    for tier in [MatchTier::Exact, MatchTier::CaseInsensitive, MatchTier::Fuzzy] {
        if tier > max_tier {
            break;
        }
        for alias in aliases {
            let alias = alias.as_ref();
            for (key, value) in fields.entries() {
                if F::is_blank(value) {
                    continue;
                }
                if tier_matches(tier, key, alias) {
                    return Some(FieldHit { key, value, tier });
                }
            }
        }
    }
    None
}

/// All three tiers.
pub fn lookup<'a, F, S>(fields: &'a F, aliases: &[S]) -> Option<&'a F::Value>
where
    F: Fields + ?Sized,
    S: AsRef<str>,
{
    resolve(fields, aliases, MatchTier::Fuzzy).map(|hit| hit.value)
}

/// Exact and case-insensitive only. Used for JSON structure where fuzzy
/// matching would pick up sibling keys (`height` vs `heightAboveGround`).
pub fn lookup_strict<'a, F, S>(fields: &'a F, aliases: &[S]) -> Option<&'a F::Value>
where
    F: Fields + ?Sized,
    S: AsRef<str>,
{
    resolve(fields, aliases, MatchTier::CaseInsensitive).map(|hit| hit.value)
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Child of a JSON object by name (case-insensitive fallback). Null counts as absent.
pub fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let obj = value.as_object()?;
    lookup_strict(obj, &[key])
}

/// Walk a chain of object keys.
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |cur, key| child(cur, key))
}

/// Items of a JSON array child; empty when absent or not an array.
pub fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    child(value, key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// String form of a scalar JSON value. Objects and arrays yield `None`.
pub fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 { format!("{}", f as i64) } else { f.to_string() }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
