#![forbid(unsafe_code)]
//! testit: a nested, event-driven async test runner
//!
//! A [`Suite`] runs a tree of named sections and inline blocks in registration order. Sections may register
//! further items while they execute, so the tree is discovered at runtime; the engine walks it iteratively with
//! an explicit stack of suspended worklists rather than recursing per level. Every item runs under a timeout,
//! and the first failure anywhere halts the run.
//!
//! Progress is published as a typed event stream ([`SuiteEvent`]). Console output, exit-code reporting and JSON
//! logs are all [`Reporter`]s layered on top of that stream.
//!
//! ```rust,no_run
//! use testit::{Suite, TestOptions};
//!
//! # async fn demo() -> testit::SuiteResult<()> {
//! let suite = Suite::new();
//! let handle = suite.clone();
//! suite.register_section("math", move || async move {
//!     handle.register_inline(|| async { assert_eq!(1 + 1, 2); Ok(()) }, TestOptions::default())?;
//!     Ok(())
//! }, TestOptions::default())?;
//! suite.run().await
//! # }
//! ```
//!
//! ## Panic Policy
//!
//! - **Library code**: Use `Result` with `?` / `map_err`. The engine and reporter modules enforce
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **User operations**: A panicking operation is caught at its task boundary and reported as a failure of that
//!   item, exactly like an `Err` return.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod config;
pub mod errors;
pub mod harness;
pub mod reporter;
pub mod suite;
pub mod timeout;

pub use config::SuiteConfig;
pub use errors::{BoxError, SuiteError, SuiteResult};
pub use harness::{Harness, HarnessArgs, OutputFormat};
pub use reporter::{ConsoleReporter, ExitReporter, JsonReporter, Outcome, OutcomeSlot, Reporter, ResultSink};
pub use suite::events::{EventKind, ListenerId, SuiteEvent};
pub use suite::item::{Done, IntoOperation, OpResult, Operation, TestOptions};
pub use suite::Suite;
pub use timeout::{DEFAULT_TIMEOUT, Timeout, with_timeout};
