use crate::lens::utils::is_true;
use anyhow::{anyhow, Result};
use config::{Config, Environment};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_API_LIMIT: u64 = 1000;
pub const MAX_API_LIMIT: u64 = 10000;
pub const DEFAULT_LG_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_LG_MAX_WAIT_SECS: u64 = 120;

const ENV_PREFIX: &str = "LGVIEW";

pub struct LgviewConfig {
    /// Base URL of the looking-glass API
    pub api_url: String,

    /// Show the looking-glass landing view (default: true)
    pub show_lg: bool,

    /// Show the peer (ASN list) and prefix views (default: true)
    pub show_peerapp: bool,

    /// Page size for prefix listings (default: 1000)
    pub default_api_limit: u64,

    /// Upper bound the server enforces on page sizes (default: 10000)
    pub max_api_limit: u64,

    /// Also write list/info load failures into the store's error state
    pub surface_load_errors: bool,

    /// Delay between status polls of a ping/trace request (default: 1000)
    pub lg_poll_interval_ms: u64,

    /// Give up on an unfinished ping/trace request after this long (default: 120)
    pub lg_max_wait_secs: u64,
}

const EMPTY_CONFIG: &str = r#"### lgview configuration file

### base URL of the looking-glass API
# api_url = "http://localhost:5000"

### views
# show_lg = true
# show_peerapp = true

### pagination
# default_api_limit = 1000
# max_api_limit = 10000

### record list/info load failures in the shared error state
# surface_load_errors = false

### ping / traceroute status polling
# lg_poll_interval_ms = 1000
# lg_max_wait_secs = 120
"#;

impl Default for LgviewConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            show_lg: true,
            show_peerapp: true,
            default_api_limit: DEFAULT_API_LIMIT,
            max_api_limit: MAX_API_LIMIT,
            surface_load_errors: false,
            lg_poll_interval_ms: DEFAULT_LG_POLL_INTERVAL_MS,
            lg_max_wait_secs: DEFAULT_LG_MAX_WAIT_SECS,
        }
    }
}

impl LgviewConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<LgviewConfig> {
        // A .env file in the working directory feeds the environment layer
        let env = environment(std::env::vars(), dotenv_entries(None));
        Self::load(path, env)
    }

    fn load(path: &Option<String>, env: Environment) -> Result<LgviewConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                // By default use $HOME/.lgview/lgview.toml as the configuration file path
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not find home directory"))?
                    .to_str()
                    .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
                    .to_owned();
                let lgview_dir = format!("{}/.lgview", home_dir.as_str());
                std::fs::create_dir_all(lgview_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create lgview directory: {}", e))?;
                let p = format!("{}/lgview.toml", lgview_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of LGVIEW)
        // E.g., `LGVIEW_SHOW_LG=no ./lgview config` would hide the looking glass
        builder = builder.add_source(env);

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    /// Build a configuration from raw string values, falling back to defaults
    pub fn from_map(config: &HashMap<String, String>) -> LgviewConfig {
        let defaults = LgviewConfig::default();
        let flag = |key: &str, default: bool| {
            config
                .get(key)
                .map(|v| is_true(v))
                .unwrap_or(default)
        };
        let number = |key: &str, default: u64| {
            config
                .get(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        LgviewConfig {
            api_url: config
                .get("api_url")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.api_url),
            show_lg: flag("show_lg", defaults.show_lg),
            show_peerapp: flag("show_peerapp", defaults.show_peerapp),
            default_api_limit: number("default_api_limit", defaults.default_api_limit),
            max_api_limit: number("max_api_limit", defaults.max_api_limit),
            surface_load_errors: flag("surface_load_errors", defaults.surface_load_errors),
            lg_poll_interval_ms: number("lg_poll_interval_ms", defaults.lg_poll_interval_ms),
            lg_max_wait_secs: number("lg_max_wait_secs", defaults.lg_max_wait_secs),
        }
    }

    /// Delay between status polls, at least 1 ms
    pub fn lg_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lg_poll_interval_ms.max(1))
    }

    pub fn lg_max_wait(&self) -> Duration {
        Duration::from_secs(self.lg_max_wait_secs)
    }

    /// Page size actually requested, clamped to `1..=max_api_limit`
    pub fn effective_limit(&self) -> u64 {
        self.default_api_limit.clamp(1, self.max_api_limit.max(1))
    }

    /// Views reachable with the current flags
    pub fn routes(&self) -> Vec<Route> {
        routes_for(self.show_lg, self.show_peerapp)
    }

    /// Whether `view` is reachable through some route
    pub fn is_routed(&self, view: View) -> bool {
        self.routes().iter().any(|r| r.view == view)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("API URL:              {}", self.api_url),
            format!("Looking Glass:        {}", enabled(self.show_lg)),
            format!("Peer Views:           {}", enabled(self.show_peerapp)),
            format!(
                "API Page Size:        {} (max {})",
                self.effective_limit(),
                self.max_api_limit
            ),
            format!(
                "Surface Load Errors:  {}",
                enabled(self.surface_load_errors)
            ),
            format!(
                "LG Polling:           every {} ms, up to {} s",
                self.lg_poll_interval_ms, self.lg_max_wait_secs
            ),
            "Routes:".to_string(),
        ];
        for route in self.routes() {
            lines.push(format!("  {:<16} {:<8} {}", route.path, route.name, route.view));
        }
        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.lgview/lgview.toml", home_dir)
    }
}

/// `.env` entries from `path`, or from the nearest `.env` above the working directory
fn dotenv_entries(path: Option<&Path>) -> Vec<(String, String)> {
    let iter = match path {
        Some(p) => dotenvy::from_path_iter(p),
        None => dotenvy::dotenv_iter(),
    };
    match iter {
        Ok(iter) => iter.filter_map(|entry| entry.ok()).collect(),
        Err(_) => vec![],
    }
}

/// The `LGVIEW_*` layer: process variables, plus `.env` entries they don't set
fn environment(
    vars: impl IntoIterator<Item = (String, String)>,
    dotenv: impl IntoIterator<Item = (String, String)>,
) -> Environment {
    let mut map: config::Map<String, String> = vars.into_iter().collect();
    for (key, value) in dotenv {
        map.entry(key).or_insert(value);
    }
    Environment::with_prefix(ENV_PREFIX).source(Some(map))
}

fn enabled(on: bool) -> &'static str {
    if on {
        "enabled"
    } else {
        "disabled"
    }
}

// =============================================================================
// Routes
// =============================================================================

/// A front-end view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Prefix lookup / search
    LookingGlass,
    /// ASN list with prefix totals
    AsnList,
    /// Prefix listing for a single ASN
    PrefixList,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::LookingGlass => write!(f, "looking glass"),
            View::AsnList => write!(f, "asn list"),
            View::PrefixList => write!(f, "prefix list"),
        }
    }
}

/// A route from a path to a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub view: View,
    pub name: &'static str,
}

/// Derive the route table from the view flags
///
/// With only the peer views enabled, the ASN list becomes the home page.
/// Otherwise the looking glass is home (even with both flags off) and the
/// peer views are added when enabled.
pub fn routes_for(show_lg: bool, show_peerapp: bool) -> Vec<Route> {
    if show_peerapp && !show_lg {
        return vec![Route {
            path: "/",
            view: View::AsnList,
            name: "home",
        }];
    }

    let mut routes = vec![Route {
        path: "/",
        view: View::LookingGlass,
        name: "home",
    }];
    if show_peerapp {
        routes.push(Route {
            path: "/peers",
            view: View::AsnList,
            name: "peers",
        });
        routes.push(Route {
            path: "/prefixes/:asn",
            view: View::PrefixList,
            name: "prefixes",
        });
    }
    routes
}
