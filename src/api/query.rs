//! Query string construction for API requests
//!
//! Options are kept in insertion order and rendered as `?key=value&key=value`.
//! A few keys are special-cased:
//!
//! - `null` values are skipped
//! - `family` is skipped when it is `"all"`
//! - `page` is never sent; it becomes `skip=(page-1)*limit&limit=limit`
//! - `asn` is coerced to an integer
//!
//! # Usage
//!
//! ```rust
//! use lgview::api::query::{build_query, QueryOptions};
//!
//! let options = QueryOptions::new()
//!     .with("asn", "210083")
//!     .with("family", "all")
//!     .with("page", 2);
//!
//! assert_eq!(build_query(&options, 1000).unwrap(), "?asn=210083&skip=1000&limit=1000");
//! ```

use crate::api::error::ApiError;
use crate::api::types::Family;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel `family` value meaning "no family filter"
pub const FAMILY_ALL: &str = "all";

/// Loosely-typed, insertion-ordered query options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    entries: Vec<(String, Value)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, keeping the original position of an existing key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed options for the prefix listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixQuery {
    pub asn: Option<u32>,
    pub family: Family,
    pub page: Option<u64>,
}

impl PrefixQuery {
    pub fn for_asn(asn: u32) -> Self {
        Self {
            asn: Some(asn),
            ..Default::default()
        }
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }
}

impl From<PrefixQuery> for QueryOptions {
    fn from(q: PrefixQuery) -> Self {
        QueryOptions::new()
            .with("asn", q.asn)
            .with("family", q.family.as_str())
            .with("page", q.page)
    }
}

/// Build a query string from `options`
///
/// `limit` is the page size used to derive `skip`/`limit` from `page`.
/// Returns an empty string when nothing is emitted.
pub fn build_query(options: &QueryOptions, limit: u64) -> Result<String, ApiError> {
    let mut fields: Vec<String> = vec![];

    for (key, value) in options.iter() {
        if value.is_null() {
            continue;
        }
        match key {
            "family" if value.as_str() == Some(FAMILY_ALL) => continue,
            "page" => {
                let page = coerce_int(key, value)?;
                let skip = (page.saturating_sub(1).max(0) as u64).saturating_mul(limit);
                fields.push(format!("skip={}", skip));
                fields.push(format!("limit={}", limit));
            }
            "asn" => {
                let asn = coerce_int(key, value)?;
                fields.push(format!("asn={}", asn));
            }
            _ => fields.push(format!("{}={}", key, render_value(value))),
        }
    }

    let mut query = String::new();
    for (i, field) in fields.iter().enumerate() {
        query.push(if i == 0 { '?' } else { '&' });
        query.push_str(field);
    }
    Ok(query)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer coercion with leading-integer semantics
///
/// Numbers truncate toward zero; strings use their leading sign and digits,
/// so `"12abc"` is 12. Anything without digits is rejected.
fn coerce_int(key: &str, value: &Value) -> Result<i64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ApiError::invalid_query(format!("option '{}' is not an integer: {}", key, value))
    })
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n: i64 = digits[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}
