//! Integration tests for the text helpers reporters depend on.
//!
//! These lock in the user-facing strings that show up in console output (durations next to results, indented
//! failure bodies).

use std::time::Duration;

use testit_core::{format_duration, indent_lines, parse_duration, render_failure};

#[test]
/// The default per-item timeout spelled the way options usually spell it must print back as the same amount.
fn default_timeout_prints_compactly() {
    let parsed = parse_duration("20 seconds").unwrap();
    assert_eq!(parsed, Duration::from_secs(20));
    assert_eq!(format_duration(parsed), "20s");
}

#[test]
/// Failure bodies are indented under the result line, blank lines included.
fn failure_body_is_indented_under_result() {
    let err = std::io::Error::other("expected 2\ngot 3");
    let body = indent_lines(&render_failure(&err), "     ");
    assert_eq!(body, "     expected 2\n     got 3");
}
