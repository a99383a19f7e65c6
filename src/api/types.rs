//! Wire records returned by the looking-glass API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

// =============================================================================
// Family
// =============================================================================

/// IP version classifier used to filter prefix listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Family {
    /// Both address families; never sent to the server
    #[default]
    All,
    V4,
    V6,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::All => "all",
            Family::V4 => "v4",
            Family::V6 => "v6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "any" => Ok(Family::All),
            "v4" | "ipv4" | "4" => Ok(Family::V4),
            "v6" | "ipv6" | "6" => Ok(Family::V6),
            _ => Err(format!("Unknown family '{}'. Valid families: all, v4, v6", s)),
        }
    }
}

// =============================================================================
// ASN mapping
// =============================================================================

/// Prefix counts announced by a single ASN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnSummary {
    #[serde(default)]
    pub v4: u64,

    #[serde(default)]
    pub v6: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,

    /// Server-side `v4 + v6`, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<u64>,
}

impl AsnSummary {
    pub fn new(v4: u64, v6: u64) -> Self {
        Self {
            v4,
            v6,
            ..Default::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.v4.saturating_add(self.v6)
    }
}

/// ASN to prefix-count mapping, keyed by ASN
///
/// JSON object keys are strings on the wire and parse into ASNs here.
pub type AsnMap = BTreeMap<u32, AsnSummary>;

// =============================================================================
// Prefixes
// =============================================================================

/// A single announced prefix
///
/// Only `id` and `prefix` carry meaning for lookups; every field the server
/// adds beyond the ones named here is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefix {
    pub id: i64,

    /// CIDR notation, e.g. `185.130.44.0/24`
    pub prefix: String,

    #[serde(default, alias = "asn", skip_serializing_if = "Option::is_none")]
    pub source_asn: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Family>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn_path: Option<Vec<u32>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page count attached to a prefix listing
///
/// The listing endpoint reports one count per family, lookups report a single
/// integer. Both shapes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageCount {
    Total(u64),
    PerFamily { all: u64, v4: u64, v6: u64 },
}

impl PageCount {
    /// Resolve the number of pages for the active family filter
    pub fn for_family(&self, family: Family) -> u64 {
        match *self {
            PageCount::Total(n) => n,
            PageCount::PerFamily { all, v4, v6 } => match family {
                Family::All => all,
                Family::V4 => v4,
                Family::V6 => v6,
            },
        }
    }
}

impl Default for PageCount {
    fn default() -> Self {
        PageCount::Total(0)
    }
}

/// One loaded page of the prefix listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefixPage {
    #[serde(default)]
    pub prefixes: Vec<Prefix>,

    #[serde(default)]
    pub pages: PageCount,
}

/// Result of a prefix lookup or search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixSearch {
    #[serde(default, deserialize_with = "one_or_many")]
    pub result: Vec<Prefix>,

    #[serde(default = "default_search_pages")]
    pub pages: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

fn default_search_pages() -> u64 {
    1
}

// exact lookups answer with a single object, searches with a list
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Prefix>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Prefix>),
        One(Box<Prefix>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(p) => vec![*p],
        OneOrMany::Nothing(()) => vec![],
    })
}

// =============================================================================
// Info
// =============================================================================

/// Server metadata exactly as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInfo {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub git_commit: Option<String>,
    #[serde(default)]
    pub git_tag: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub latest_prefix_time: Option<String>,
    #[serde(default)]
    pub latest_prefix: Option<Prefix>,
    #[serde(default)]
    pub prefix_timeout: Option<u64>,
    #[serde(default)]
    pub prefix_timeout_warn: Option<u64>,
    #[serde(default)]
    pub total_prefixes: Option<u64>,
}

/// Server metadata with `latest_prefix_time` parsed into a date
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Info {
    pub message: Option<String>,
    pub git_commit: Option<String>,
    pub git_tag: Option<String>,
    pub git_branch: Option<String>,
    pub latest_prefix_time: Option<DateTime<Utc>>,
    pub latest_prefix: Option<Prefix>,
    pub prefix_timeout: Option<u64>,
    pub prefix_timeout_warn: Option<u64>,
    pub total_prefixes: Option<u64>,
}

impl RawInfo {
    /// Consume the wire record, parsing the timestamp
    ///
    /// An unparsable timestamp is logged and left empty.
    pub fn parse(self) -> Info {
        let latest_prefix_time = self.latest_prefix_time.as_deref().and_then(|s| {
            let parsed = parse_timestamp(s);
            if parsed.is_none() {
                warn!("unable to parse latest_prefix_time '{}'", s);
            }
            parsed
        });

        Info {
            message: self.message,
            git_commit: self.git_commit,
            git_tag: self.git_tag,
            git_branch: self.git_branch,
            latest_prefix_time,
            latest_prefix: self.latest_prefix,
            prefix_timeout: self.prefix_timeout,
            prefix_timeout_warn: self.prefix_timeout_warn,
            total_prefixes: self.total_prefixes,
        }
    }
}

/// Parse a server timestamp
///
/// Accepts:
/// - RFC3339 strings (e.g., "2019-08-21T02:30:00Z")
/// - HTTP dates as emitted by the server (e.g., "Wed, 21 Aug 2019 02:30:00 GMT")
/// - anything else `dateparser` understands, including Unix timestamps
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    dateparser::parse(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_asn_map_from_server_json() {
        let json = r#"{
            "8896": {"as_name": "XFIBER-AS, NO", "asn": 8896, "prefixes": 41, "v4": 41, "v6": 0},
            "210083": {"as_name": "Privex Inc.", "asn": 210083, "prefixes": 5, "v4": 1, "v6": 4}
        }"#;
        let asns: AsnMap = serde_json::from_str(json).unwrap();
        assert_eq!(asns.len(), 2);
        assert_eq!(asns[&210083].v6, 4);
        assert_eq!(asns[&8896].as_name.as_deref(), Some("XFIBER-AS, NO"));
        assert_eq!(asns[&8896].total(), 41);
    }

    #[test]
    fn test_asn_map_rejects_negative_counts() {
        let json = r#"{"1": {"v4": -1, "v6": 0}}"#;
        assert!(serde_json::from_str::<AsnMap>(json).is_err());
    }

    #[test]
    fn test_prefix_page_per_family_pages() {
        let json = r#"{
            "pages": {"all": 3, "v4": 2, "v6": 1},
            "prefixes": [
                {"id": 1, "prefix": "185.130.44.0/24", "source_asn": 210083, "family": "v4",
                 "ixp": "N/A", "asn_path": [210083], "communities": [300, 400]}
            ]
        }"#;
        let page: PrefixPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.pages.for_family(Family::All), 3);
        assert_eq!(page.pages.for_family(Family::V6), 1);
        let p = &page.prefixes[0];
        assert_eq!(p.source_asn, Some(210083));
        assert_eq!(p.family, Some(Family::V4));
        assert_eq!(p.extra.get("ixp"), Some(&Value::from("N/A")));
        assert!(p.extra.contains_key("communities"));
    }

    #[test]
    fn test_prefix_page_integer_pages() {
        let page: PrefixPage = serde_json::from_str(r#"{"prefixes": [], "pages": 4}"#).unwrap();
        assert_eq!(page.pages, PageCount::Total(4));
        assert_eq!(page.pages.for_family(Family::V4), 4);
    }

    #[test]
    fn test_search_single_result() {
        let json = r#"{"error": false, "result": {"id": 3, "prefix": "1.1.1.0/24", "source_asn": 13335}}"#;
        let search: PrefixSearch = serde_json::from_str(json).unwrap();
        assert_eq!(search.result.len(), 1);
        assert_eq!(search.pages, 1);
    }

    #[test]
    fn test_search_many_results() {
        let json = r#"{"error": false, "count": 2, "total": 2, "pages": 0, "result": [
            {"id": 1, "prefix": "1.255.3.0/24"}, {"id": 2, "prefix": "1.255.6.0/24"}
        ]}"#;
        let search: PrefixSearch = serde_json::from_str(json).unwrap();
        assert_eq!(search.result.len(), 2);
        assert_eq!(search.pages, 0);
        assert_eq!(search.total, Some(2));
    }

    #[test]
    fn test_parse_http_date() {
        let dt = parse_timestamp("Wed, 21 Aug 2019 02:30:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2019, 8, 21, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2020-04-24T21:40:12Z").unwrap();
        assert_eq!(dt.timestamp(), 1587764412);
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_raw_info_parse() {
        let raw: RawInfo = serde_json::from_str(
            r#"{"message": "hello", "latest_prefix_time": "Wed, 21 Aug 2019 02:30:00 GMT", "total_prefixes": 10}"#,
        )
        .unwrap();
        let info = raw.parse();
        assert_eq!(info.message.as_deref(), Some("hello"));
        assert_eq!(info.total_prefixes, Some(10));
        assert!(info.latest_prefix_time.is_some());

        let info = RawInfo {
            latest_prefix_time: Some("not a date at all".to_string()),
            ..Default::default()
        }
        .parse();
        assert!(info.latest_prefix_time.is_none());
    }
}
