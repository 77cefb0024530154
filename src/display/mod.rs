//! Terminal display for the admin CLI.
//!
//! Result tables, indexing progress and status styling. The query binaries
//! never use this module; their stdout is reserved for JSON.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::create_progress_bar;
pub use tables::{TableBuilder, create_index_summary_table, create_results_table};
pub use theme::{THEME, Theme};
