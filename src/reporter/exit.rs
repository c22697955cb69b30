//! End-of-run reporting: total duration and the suite's pass/fail result.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use testit_core::format_duration;

use super::Reporter;
use crate::errors::SuiteError;

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Pass => ExitCode::SUCCESS,
            Outcome::Fail => ExitCode::FAILURE,
        }
    }
}

/// Receives the suite's result exactly once per run.
pub trait ResultSink: Send {
    fn report(&mut self, suite: &str, outcome: Outcome);
}

impl<F> ResultSink for F
where
    F: FnMut(&str, Outcome) + Send,
{
    fn report(&mut self, suite: &str, outcome: Outcome) {
        self(suite, outcome)
    }
}

/// Shared slot holding the reported outcome, readable after the run.
#[derive(Debug, Clone, Default)]
pub struct OutcomeSlot(Arc<Mutex<Option<Outcome>>>);

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Outcome> {
        *self.0.lock()
    }
}

impl ResultSink for OutcomeSlot {
    fn report(&mut self, _suite: &str, outcome: Outcome) {
        *self.0.lock() = Some(outcome);
    }
}

/// Prints the total duration and forwards the outcome to a [`ResultSink`].
pub struct ExitReporter {
    name: String,
    out: Box<dyn Write + Send>,
    sink: Box<dyn ResultSink>,
    started: Instant,
}

impl ExitReporter {
    pub fn new(name: impl Into<String>, out: impl Write + Send + 'static, sink: impl ResultSink + 'static) -> Self {
        Self {
            name: name.into(),
            out: Box::new(out),
            sink: Box::new(sink),
            started: Instant::now(),
        }
    }

    pub fn stdout(name: impl Into<String>, sink: impl ResultSink + 'static) -> Self {
        Self::new(name, io::stdout(), sink)
    }

    fn conclude(&mut self, outcome: Outcome) {
        let total = format_duration(self.started.elapsed());
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "Total duration {total}");
        self.sink.report(&self.name, outcome);
    }
}

impl Reporter for ExitReporter {
    fn on_suite_start(&mut self) {
        self.started = Instant::now();
    }

    fn on_suite_pass(&mut self) {
        self.conclude(Outcome::Pass);
    }

    fn on_suite_fail(&mut self, _error: &SuiteError) {
        self.conclude(Outcome::Fail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::events::SuiteEvent;

    #[test]
    fn slot_records_the_outcome() {
        let slot = OutcomeSlot::new();
        let mut reporter = ExitReporter::new("unit", io::sink(), slot.clone());
        assert_eq!(slot.get(), None);

        reporter.on_event(&SuiteEvent::SuiteStart);
        reporter.on_event(&SuiteEvent::SuitePass);
        assert_eq!(slot.get(), Some(Outcome::Pass));
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut reporter = ExitReporter::new("named", io::sink(), move |suite: &str, outcome: Outcome| {
            log.lock().push((suite.to_string(), outcome));
        });

        let err = SuiteError::Cancelled;
        reporter.on_event(&SuiteEvent::SuiteFail { error: &err });
        assert_eq!(*seen.lock(), vec![("named".to_string(), Outcome::Fail)]);
    }

    #[test]
    fn outcome_maps_to_exit_code() {
        assert_eq!(Outcome::Pass.exit_code(), ExitCode::SUCCESS);
        assert_eq!(Outcome::Fail.exit_code(), ExitCode::FAILURE);
    }
}
