pub mod config;
pub mod info;
pub mod lg;
pub mod lookup;
pub mod peers;
pub mod prefixes;

use lgview::lens::utils::{trim_name_default, trim_path, DEFAULT_PATH_HOPS};
use lgview::{OutputFormat, Prefix};
use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Print rows in the requested output format
pub(crate) fn print_rows<T: Tabled + Serialize>(rows: &[T], output_format: OutputFormat) {
    match output_format {
        OutputFormat::Table => {
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        OutputFormat::Markdown => {
            println!("{}", Table::new(rows).with(Style::markdown()));
        }
        OutputFormat::Json => match serde_json::to_string(rows) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(rows) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonLine => {
            for row in rows {
                match serde_json::to_string(row) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
                }
            }
        }
        OutputFormat::Psv => {
            println!("{}", T::headers().join("|"));
            for row in rows {
                println!("{}", row.fields().join("|"));
            }
        }
    }
}

/// Print a single serializable value as JSON, honoring pretty output
pub(crate) fn print_json<T: Serialize>(value: &T, output_format: OutputFormat) {
    let res = match output_format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value),
        _ => serde_json::to_string(value),
    };
    match res {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
    }
}

/// Table row for a prefix
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct PrefixRow {
    id: i64,
    prefix: String,
    asn: String,
    name: String,
    path: String,
    last_seen: String,
}

impl From<&Prefix> for PrefixRow {
    fn from(p: &Prefix) -> Self {
        let extra_str = |key: &str| {
            p.extra
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        PrefixRow {
            id: p.id,
            prefix: p.prefix.clone(),
            asn: p.source_asn.map(|a| a.to_string()).unwrap_or_default(),
            name: trim_name_default(p.as_name.as_deref().unwrap_or_default()),
            path: trim_path(
                p.asn_path.as_deref().unwrap_or_default(),
                DEFAULT_PATH_HOPS,
                DEFAULT_PATH_HOPS,
            ),
            last_seen: extra_str("last_seen"),
        }
    }
}
