//! Reporters: presentation layered on the event stream.
//!
//! ## Reporter Trait
//!
//! A [`Reporter`] receives every [`SuiteEvent`] through [`Reporter::on_event`]. The default implementation fans
//! events out to one hook per event kind, so most reporters only override the hooks they care about. Reporters
//! that want the raw stream (like [`JsonReporter`]) override `on_event` itself.
//!
//! Stock reporters:
//! - [`ConsoleReporter`]: indented, colored progress lines with durations and failure bodies
//! - [`ExitReporter`]: total duration plus a single pass/fail notification to a [`ResultSink`]
//! - [`JsonReporter`]: one JSON object per event

// Enforce explicit error handling - no panicking in reporters
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod console;
pub mod exit;
pub mod json;

pub use console::ConsoleReporter;
pub use exit::{ExitReporter, Outcome, OutcomeSlot, ResultSink};
pub use json::JsonReporter;

use crate::errors::SuiteError;
use crate::suite::events::SuiteEvent;

/// Trait for presenting suite progress.
///
/// Implement this trait to customize output (TAP, JUnit, ...) and attach it with
/// [`Suite::add_reporter`](crate::Suite::add_reporter).
pub trait Reporter: Send {
    /// Called for every event; dispatches to the hooks below by default.
    fn on_event(&mut self, event: &SuiteEvent<'_>) {
        match *event {
            SuiteEvent::SuiteStart => self.on_suite_start(),
            SuiteEvent::SuitePass => self.on_suite_pass(),
            SuiteEvent::SuiteFail { error } => self.on_suite_fail(error),
            SuiteEvent::Start { name } => self.on_section_start(name),
            SuiteEvent::End { name } => self.on_section_end(name),
            SuiteEvent::StartSection { name } => self.on_children_start(name),
            SuiteEvent::EndSection { name } => self.on_children_end(name),
            SuiteEvent::Pass { name } => self.on_section_pass(name),
            SuiteEvent::Fail { name, error } => self.on_section_fail(name, error),
            SuiteEvent::RunStart => self.on_run_start(),
            SuiteEvent::RunEnd => self.on_run_end(),
            SuiteEvent::RunPass => self.on_run_pass(),
            SuiteEvent::RunFail { error } => self.on_run_fail(error),
        }
    }

    /// Called when the run begins
    fn on_suite_start(&mut self) {}

    /// Called once when the whole tree has passed
    fn on_suite_pass(&mut self) {}

    /// Called once when the run is aborted by a failure
    fn on_suite_fail(&mut self, _error: &SuiteError) {}

    /// Called when a section's operation starts
    fn on_section_start(&mut self, _name: &str) {}

    /// Called when a section and all of its children are done
    fn on_section_end(&mut self, _name: &str) {}

    /// Called when a section registered children and they are about to run
    fn on_children_start(&mut self, _name: &str) {}

    /// Called when a section's children have all run
    fn on_children_end(&mut self, _name: &str) {}

    /// Called when a section without children passes
    fn on_section_pass(&mut self, _name: &str) {}

    /// Called when a section's operation fails
    fn on_section_fail(&mut self, _name: &str, _error: &SuiteError) {}

    fn on_run_start(&mut self) {}

    fn on_run_end(&mut self) {}

    fn on_run_pass(&mut self) {}

    fn on_run_fail(&mut self, _error: &SuiteError) {}
}
