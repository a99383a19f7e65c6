#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! lgview - A looking-glass peer visibility client
//!
//! lgview talks to a looking-glass JSON API to list peer ASNs with their
//! announced prefix counts, browse the prefixes of a single ASN page by page,
//! search for a prefix or IP address, and run ping or traceroute from the
//! looking glass. It can be used as both a
//! command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | Full CLI binary (default) | All above + `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only
//! lgview = { version = "0.1", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`api`]**: the API client
//!   - `query`: query string construction (pagination, ASN coercion)
//!   - `transport`: the HTTP seam (`Transport` trait, `ureq` implementation)
//!   - `types`: wire records
//!   - `lg`: ping/traceroute requests and host validation
//!   - `error`: the structured `ApiError`
//! - **[`store`]**: the central store; sole owner and mutator of state
//! - **[`lens`]**: totals aggregation and display helpers
//! - **[`config`]**: configuration, view flags and routes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lgview::{LgviewConfig, Store};
//!
//! let config = LgviewConfig::new(&None)?;
//! let store = Store::from_config(&config);
//!
//! let (asns, info) = store.start().await;
//! asns?;
//! info?;
//!
//! let state = store.snapshot().await;
//! println!(
//!     "{} ASNs announcing {} prefixes ({} v4, {} v6)",
//!     state.asns.len(),
//!     state.totals.all,
//!     state.totals.v4,
//!     state.totals.v6
//! );
//!
//! store.search_prefixes("185.130.44.0/24", true, None).await;
//! let state = store.snapshot().await;
//! if state.error.error {
//!     eprintln!("search failed: {}", state.error);
//! }
//! ```

pub mod api;
pub mod config;
pub mod lens;
pub mod store;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{routes_for, LgviewConfig, Route, View};

// =============================================================================
// API client
// =============================================================================

pub use api::{
    build_query, ApiError, AsnMap, AsnSummary, Family, HttpResponse, Info, LgAction, LgApi,
    LgRequest, LookupOptions, PageCount, Prefix, PrefixPage, PrefixQuery, PrefixSearch, Proto,
    QueryOptions, RawInfo, RequestStatus, Transport, UreqTransport,
};

// =============================================================================
// Store
// =============================================================================

pub use store::{Mutation, State, Store, StoreOptions};

// =============================================================================
// Lens
// =============================================================================

pub use lens::totals::{calculate_totals, Totals};
pub use lens::utils::{is_true, trim_name, trim_path, OutputFormat};
