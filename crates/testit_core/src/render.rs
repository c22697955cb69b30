//! Failure rendering for reports.

use std::error::Error;

/// Render a failure with as much context as the error carries.
///
/// When the error has a `source()` chain, the chain is the structured trace: the error's own summary comes first,
/// followed by a `Caused by:` list. Errors without sources render as their plain `Display` text.
///
/// ## Examples
/// ```rust
/// use testit_core::render_failure;
/// let err = std::io::Error::other("disk full");
/// assert_eq!(render_failure(&err), "disk full");
/// ```
pub fn render_failure(err: &(dyn Error + 'static)) -> String {
    let summary = err.to_string();
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        // Wrapper errors often repeat their source verbatim in their own message.
        if !summary.ends_with(&text) || !causes.is_empty() {
            causes.push(text);
        }
        current = cause.source();
    }

    if causes.is_empty() {
        return summary;
    }

    let mut out = summary;
    out.push_str("\n\nCaused by:");
    for (i, cause) in causes.iter().enumerate() {
        out.push_str(&format!("\n    {i}: {cause}"));
    }
    out
}

/// Prefix every line of `text` (including blank lines) with `prefix`.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
