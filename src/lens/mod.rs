//! Lens module
//!
//! Presentation-side logic shared by every front-end: the derived prefix
//! totals and the display helpers (output formats, name and path trimming).
//! Lenses never talk to the network and never hold state; they take values
//! and return new ones.
//!
//! ```rust,ignore
//! use lgview::lens::totals::{calculate_totals, Totals};
//! use lgview::lens::utils::{trim_name, OutputFormat};
//! ```

pub mod totals;
pub mod utils;
