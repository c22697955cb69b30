//! Deadline wrapper for item operations.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use testit_core::{format_duration, parse_duration};

use crate::errors::{SuiteError, SuiteResult};

/// Timeout applied to items that do not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// How long an item may run before it is failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// No deadline; the operation may take as long as it likes.
    Disabled,
    After(Duration),
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::After(DEFAULT_TIMEOUT)
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::After(duration)
    }
}

impl FromStr for Timeout {
    type Err = SuiteError;

    /// Accepts duration strings (`"20 seconds"`, `"1.5s"`, `"250"`) and the disable sentinels
    /// `Infinity`, `inf`, `none`, `off`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "infinity" | "inf" | "none" | "off" => Ok(Timeout::Disabled),
            _ => Ok(Timeout::After(parse_duration(s)?)),
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Disabled => f.write_str("Infinity"),
            Timeout::After(duration) => f.write_str(&format_duration(*duration)),
        }
    }
}

/// Race `operation` against `limit`.
///
/// With [`Timeout::Disabled`] the operation's own outcome is returned and no timer is armed. Otherwise the first
/// to finish wins: the operation's outcome is forwarded unchanged, or [`SuiteError::TimedOut`] is returned and
/// `operation` is dropped without being polled again.
pub async fn with_timeout<F, T>(operation: F, limit: Timeout) -> SuiteResult<T>
where
    F: Future<Output = SuiteResult<T>>,
{
    match limit {
        Timeout::Disabled => operation.await,
        Timeout::After(after) => match tokio::time::timeout(after, operation).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(timeout = %format_duration(after), "operation timed out");
                Err(SuiteError::TimedOut(after))
            }
        },
    }
}
