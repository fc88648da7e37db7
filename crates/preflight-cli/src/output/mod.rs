//! Output formatting modules.

pub mod json;
pub mod table;
pub mod text;

pub use json::format_json;
pub use table::{format_stats, EnvironmentRow};
pub use text::{format_suggestions, format_validation, CheckSummary};
