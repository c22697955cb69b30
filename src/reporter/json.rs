//! JSON lines reporter: one object per event.
//!
//! ```text
//! {"event":"start","name":"parser","elapsed_ms":0}
//! {"event":"run-fail","error":"operation timed out after 1s","elapsed_ms":1003}
//! ```

use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;
use testit_core::render_failure;

use super::Reporter;
use crate::suite::events::{EventKind, SuiteEvent};

#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    event: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Milliseconds since the reporter was created.
    elapsed_ms: u64,
}

pub struct JsonReporter {
    out: Box<dyn Write + Send>,
    created: Instant,
}

impl JsonReporter {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            created: Instant::now(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Reporter for JsonReporter {
    fn on_event(&mut self, event: &SuiteEvent<'_>) {
        let record = EventRecord {
            event: event.kind(),
            name: event.name(),
            error: event.error().map(|e| render_failure(e)),
            elapsed_ms: self.created.elapsed().as_millis() as u64,
        };
        match serde_json::to_string(&record) {
            Ok(line) => {
                let _ = writeln!(self.out, "{line}");
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize event"),
        }
    }
}
