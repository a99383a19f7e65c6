//! Common utility functions for display
//!
//! This module provides the presentation helpers shared by every view:
//! output format selection, name and AS-path trimming, and the boolean
//! coercion used for feature flags.

use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default maximum length for name display in tables
pub const DEFAULT_NAME_MAX_LEN: usize = 20;

/// Default maximum number of words kept when a name is trimmed
pub const DEFAULT_NAME_MAX_WORDS: usize = 3;

/// Default number of hops shown at each end of a trimmed AS path
pub const DEFAULT_PATH_HOPS: usize = 3;

const ELLIPSIS: &str = "...";

/// Unified output format for all commands
///
/// Commands that don't support a particular format should return an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line per object)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line, for streaming)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Check if this is a table variant
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::Markdown)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Trim a long name for display, keeping whole words where possible
///
/// Names of at most `max_len` characters are returned unchanged. Longer names
/// keep their first `max_words` words, dropping more words while the result
/// (including the trailing `...`) is still longer than `max_len`. When not
/// even the first word fits, it is cut by characters.
///
/// # Examples
///
/// ```
/// use lgview::lens::utils::trim_name;
///
/// assert_eq!(trim_name("Privex Inc.", 20, 3), "Privex Inc.");
/// assert_eq!(
///     trim_name("HURRICANE ELECTRIC LLC INTERNET SERVICES", 24, 3),
///     "HURRICANE ELECTRIC..."
/// );
/// ```
pub fn trim_name(name: &str, max_len: usize, max_words: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    let budget = max_len.saturating_sub(ELLIPSIS.len());
    let mut n = max_words.min(words.len());
    while n > 0 {
        let candidate = words[..n].join(" ");
        let candidate = candidate.trim_end_matches([',', ';', '-']);
        if !candidate.is_empty() && candidate.chars().count() <= budget {
            return format!("{}{}", candidate, ELLIPSIS);
        }
        n -= 1;
    }

    let truncated: String = name.chars().take(budget).collect();
    format!("{}{}", truncated.trim_end(), ELLIPSIS)
}

/// Trim a name with the default length and word limits
pub fn trim_name_default(name: &str) -> String {
    trim_name(name, DEFAULT_NAME_MAX_LEN, DEFAULT_NAME_MAX_WORDS)
}

/// Render an AS path, eliding the middle of long paths
///
/// Paths with more than `start_hops + end_hops` hops show the first
/// `start_hops` and last `end_hops` hops around `...`.
///
/// ```
/// use lgview::lens::utils::trim_path;
///
/// assert_eq!(trim_path(&[1, 2, 3], 3, 3), "1, 2, 3");
/// assert_eq!(trim_path(&[1, 2, 3, 4, 5, 6, 7], 2, 2), "1, 2 ... 6, 7");
/// ```
pub fn trim_path(path: &[u32], start_hops: usize, end_hops: usize) -> String {
    let join = |hops: &[u32]| {
        hops.iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if path.len() > start_hops + end_hops {
        format!(
            "{} {} {}",
            join(&path[..start_hops]),
            ELLIPSIS,
            join(&path[path.len() - end_hops..])
        )
    } else {
        join(path)
    }
}

/// Relative age of `time` as seen from `now`, e.g. "5 minutes ago"
pub fn format_age(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    HumanTime::from(time - now).to_string()
}

/// Boolean coercion for flag values
///
/// `"1"`, `"true"` and `"yes"` (any case, surrounding whitespace ignored)
/// are true; everything else is false.
pub fn is_true(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_name_short() {
        assert_eq!(trim_name("Short", 20, 3), "Short");
        assert_eq!(trim_name("", 20, 3), "");
    }

    #[test]
    fn test_trim_name_exact_limit() {
        assert_eq!(
            trim_name("12345678901234567890", 20, 3),
            "12345678901234567890"
        );
    }

    #[test]
    fn test_trim_name_word_limit() {
        // first three words fit within the budget
        assert_eq!(
            trim_name("AS for the Internet of Things", 20, 3),
            "AS for the..."
        );
    }

    #[test]
    fn test_trim_name_drops_words_until_it_fits() {
        assert_eq!(
            trim_name("CLOUDFLARENET Cloudflare Incorporated", 20, 3),
            "CLOUDFLARENET..."
        );
    }

    #[test]
    fn test_trim_name_strips_trailing_separator() {
        assert_eq!(
            trim_name("XFIBER-AS, NO Norwegian Fibre Networks", 20, 1),
            "XFIBER-AS..."
        );
    }

    #[test]
    fn test_trim_name_single_long_word() {
        assert_eq!(
            trim_name("ABCDEFGHIJKLMNOPQRSTUVWXYZ", 10, 3),
            "ABCDEFG..."
        );
    }

    #[test]
    fn test_trim_name_unicode() {
        // counted by char, not bytes
        assert_eq!(
            trim_name("日本語テスト名前これは長い", 10, 3),
            "日本語テスト名..."
        );
    }

    #[test]
    fn test_trim_name_result_bounds() {
        let names = [
            "HURRICANE ELECTRIC LLC INTERNET SERVICES",
            "a b c d e f g h i j k l m n o p",
            "Telia Company AB Carrier Network",
        ];
        for name in names {
            let trimmed = trim_name(name, 16, 3);
            assert!(trimmed.ends_with("..."));
            assert!(trimmed.chars().count() <= 16);
            let words = trimmed.trim_end_matches("...").split_whitespace().count();
            assert!(words <= 3);
        }
    }

    #[test]
    fn test_trim_name_small_max() {
        assert_eq!(trim_name("Hello", 3, 3), "...");
        assert_eq!(trim_name("Hi", 3, 3), "Hi");
    }

    #[test]
    fn test_trim_path() {
        assert_eq!(trim_path(&[], 3, 3), "");
        assert_eq!(trim_path(&[210083], 3, 3), "210083");
        assert_eq!(trim_path(&[1, 2, 3, 4, 5, 6], 3, 3), "1, 2, 3, 4, 5, 6");
        assert_eq!(
            trim_path(&[1, 2, 3, 4, 5, 6, 7], 3, 3),
            "1, 2, 3 ... 5, 6, 7"
        );
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        let age = format_age(now - chrono::Duration::minutes(5), now);
        assert_eq!(age, "5 minutes ago");
    }

    #[test]
    fn test_is_true() {
        for v in ["1", "true", "TRUE", "yes", "Yes", " true "] {
            assert!(is_true(v), "{v}");
        }
        for v in ["0", "false", "no", "", "on", "y"] {
            assert!(!is_true(v), "{v}");
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("table").unwrap(),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("jsonl").unwrap(),
            OutputFormat::JsonLine
        );
        assert_eq!(OutputFormat::from_str("psv").unwrap(), OutputFormat::Psv);
        assert!(OutputFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::JsonPretty.to_string(), "json-pretty");
        assert_eq!(OutputFormat::Psv.to_string(), "psv");
    }

    #[test]
    fn test_output_format_kinds() {
        assert!(OutputFormat::JsonLine.is_json());
        assert!(!OutputFormat::Psv.is_json());
        assert!(OutputFormat::Markdown.is_table());
        assert!(!OutputFormat::Json.is_table());
    }
}
