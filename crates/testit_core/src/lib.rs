//! Provide pure helpers shared by the `testit` engine and its reporters.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic helpers that both:
//! - the engine uses to interpret per-item timeout options (`"20 seconds"`, `"1.5s"`, `250`), and
//! - the reporters use to present durations and failures consistently.
//!
//! ## Notes
//!
//! - **No IO**, no global state, and no engine-specific types.
//! - Current scope: `ms`-style duration parsing and compact formatting, failure rendering (error `source()` chains),
//!   and line indentation for nested report output.

pub mod duration;
pub mod render;

pub use duration::{ParseDurationError, format_duration, parse_duration};
pub use render::{indent_lines, render_failure};
