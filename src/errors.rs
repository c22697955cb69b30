//! Error taxonomy for registration and runs.
//!
//! Three families:
//! - precondition violations, returned synchronously from registration or `run()` and never entering the run loop
//! - operation failures, raised by the registered operation itself (an `Err`, a panic, or a dropped callback)
//! - timeouts, generated by the engine when an operation does not settle in time

use std::time::Duration;

use miette::Diagnostic;
use testit_core::{ParseDurationError, format_duration};
use thiserror::Error;

/// Error type returned by user operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for suite operations.
pub type SuiteResult<T> = Result<T, SuiteError>;

#[derive(Debug, Error, Diagnostic)]
pub enum SuiteError {
    #[error("section name must not be empty")]
    #[diagnostic(
        code(testit::precondition::empty_name),
        help("register unnamed work with `Suite::register_inline` instead")
    )]
    EmptySectionName,

    #[error("cannot register '{0}' from inside an inline block")]
    #[diagnostic(
        code(testit::precondition::inline_nesting),
        help("inline blocks are leaves; register nested work from a section instead")
    )]
    InlineNesting(String),

    #[error("suite '{0}' has already been started")]
    #[diagnostic(code(testit::precondition::already_started), help("construct a new `Suite` for each run"))]
    AlreadyStarted(String),

    #[error("cannot register '{0}': the suite has finished running")]
    #[diagnostic(code(testit::precondition::finished))]
    Finished(String),

    #[error("invalid timeout: {0}")]
    #[diagnostic(
        code(testit::precondition::invalid_timeout),
        help("use a duration such as \"20 seconds\" or \"500ms\", or \"Infinity\" to disable")
    )]
    InvalidTimeout(#[from] ParseDurationError),

    #[error("{0}")]
    #[diagnostic(code(testit::run::failed))]
    Failed(#[source] BoxError),

    #[error("operation panicked: {0}")]
    #[diagnostic(code(testit::run::panicked))]
    Panicked(String),

    #[error("completion callback was dropped without being called")]
    #[diagnostic(
        code(testit::run::callback_dropped),
        help("call `done.pass()`, `done.fail(..)` or `done.finish(..)` exactly once")
    )]
    CallbackDropped,

    #[error("operation was cancelled before it completed")]
    #[diagnostic(code(testit::run::cancelled))]
    Cancelled,

    #[error("operation timed out after {}", format_duration(*.0))]
    #[diagnostic(code(testit::run::timed_out))]
    TimedOut(Duration),
}

impl SuiteError {
    /// Whether this error was raised synchronously by bad registration or run arguments.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SuiteError::EmptySectionName
                | SuiteError::InlineNesting(_)
                | SuiteError::AlreadyStarted(_)
                | SuiteError::Finished(_)
                | SuiteError::InvalidTimeout(_)
        )
    }

    /// Whether this error was generated by the engine's deadline rather than the operation.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SuiteError::TimedOut(_))
    }
}
