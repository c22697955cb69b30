//! Typed lifecycle events and the listener registry.
//!
//! The event set is fixed: [`EventKind`] enumerates it, [`SuiteEvent`] carries the payload. Events borrow their
//! payload from the engine, so listeners see them only for the duration of the call.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::errors::SuiteError;

/// The fixed set of events a suite emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    SuiteStart,
    SuitePass,
    SuiteFail,
    Start,
    End,
    StartSection,
    EndSection,
    Pass,
    Fail,
    RunStart,
    RunEnd,
    RunPass,
    RunFail,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::SuiteStart,
        EventKind::SuitePass,
        EventKind::SuiteFail,
        EventKind::Start,
        EventKind::End,
        EventKind::StartSection,
        EventKind::EndSection,
        EventKind::Pass,
        EventKind::Fail,
        EventKind::RunStart,
        EventKind::RunEnd,
        EventKind::RunPass,
        EventKind::RunFail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::SuiteStart => "suite-start",
            EventKind::SuitePass => "suite-pass",
            EventKind::SuiteFail => "suite-fail",
            EventKind::Start => "start",
            EventKind::End => "end",
            EventKind::StartSection => "start-section",
            EventKind::EndSection => "end-section",
            EventKind::Pass => "pass",
            EventKind::Fail => "fail",
            EventKind::RunStart => "run-start",
            EventKind::RunEnd => "run-end",
            EventKind::RunPass => "run-pass",
            EventKind::RunFail => "run-fail",
        }
    }

    /// Whether this kind ends a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::SuitePass | EventKind::SuiteFail)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event with its payload.
///
/// | Event | Meaning |
/// |---|---|
/// | `SuiteStart` / `SuitePass` / `SuiteFail` | run begun / whole tree passed / aborted on the first failure |
/// | `Start` / `End` | a section's operation begins / the section and everything under it is done |
/// | `StartSection` / `EndSection` | a section registered children and they are about to run / have all run |
/// | `Pass` / `Fail` | outcome of a section's own operation (`Pass` only for sections without children) |
/// | `RunStart` / `RunEnd` / `RunPass` / `RunFail` | the same for an inline block |
#[derive(Debug, Clone, Copy)]
pub enum SuiteEvent<'a> {
    SuiteStart,
    SuitePass,
    SuiteFail { error: &'a SuiteError },
    Start { name: &'a str },
    End { name: &'a str },
    StartSection { name: &'a str },
    EndSection { name: &'a str },
    Pass { name: &'a str },
    Fail { name: &'a str, error: &'a SuiteError },
    RunStart,
    RunEnd,
    RunPass,
    RunFail { error: &'a SuiteError },
}

impl<'a> SuiteEvent<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            SuiteEvent::SuiteStart => EventKind::SuiteStart,
            SuiteEvent::SuitePass => EventKind::SuitePass,
            SuiteEvent::SuiteFail { .. } => EventKind::SuiteFail,
            SuiteEvent::Start { .. } => EventKind::Start,
            SuiteEvent::End { .. } => EventKind::End,
            SuiteEvent::StartSection { .. } => EventKind::StartSection,
            SuiteEvent::EndSection { .. } => EventKind::EndSection,
            SuiteEvent::Pass { .. } => EventKind::Pass,
            SuiteEvent::Fail { .. } => EventKind::Fail,
            SuiteEvent::RunStart => EventKind::RunStart,
            SuiteEvent::RunEnd => EventKind::RunEnd,
            SuiteEvent::RunPass => EventKind::RunPass,
            SuiteEvent::RunFail { .. } => EventKind::RunFail,
        }
    }

    /// Section name, for section events.
    pub fn name(&self) -> Option<&'a str> {
        match *self {
            SuiteEvent::Start { name }
            | SuiteEvent::End { name }
            | SuiteEvent::StartSection { name }
            | SuiteEvent::EndSection { name }
            | SuiteEvent::Pass { name }
            | SuiteEvent::Fail { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Captured failure, for `*-fail` events.
    pub fn error(&self) -> Option<&'a SuiteError> {
        match *self {
            SuiteEvent::SuiteFail { error } | SuiteEvent::Fail { error, .. } | SuiteEvent::RunFail { error } => {
                Some(error)
            }
            _ => None,
        }
    }
}

/// Renders as `kind`, `kind name`, or `kind name: error`.
impl fmt::Display for SuiteEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())?;
        if let Some(name) = self.name() {
            write!(f, " {name}")?;
        }
        if let Some(error) = self.error() {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}

/// Handle returned by subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&SuiteEvent<'_>) + Send>;

/// A callback that can be invoked after the registry lock is released.
pub(crate) type SharedCallback = Arc<Mutex<Callback>>;

struct Listener {
    id: ListenerId,
    /// `None` receives every event.
    filter: Option<EventKind>,
    callback: SharedCallback,
}

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<Listener>,
}

impl Listeners {
    pub fn add(&mut self, filter: Option<EventKind>, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Listener {
            id,
            filter,
            callback: Arc::new(Mutex::new(callback)),
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    /// Listeners matching `kind`, in subscription order.
    ///
    /// The caller dispatches from this snapshot with the registry unlocked, so callbacks are free to subscribe or
    /// unsubscribe. Changes take effect from the next event.
    pub fn matching(&self, kind: EventKind) -> Vec<SharedCallback> {
        self.entries
            .iter()
            .filter(|l| l.filter.is_none_or(|k| k == kind))
            .map(|l| Arc::clone(&l.callback))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Deliver `event` to each callback in turn.
pub(crate) fn dispatch(targets: &[SharedCallback], event: &SuiteEvent<'_>) {
    for callback in targets {
        (callback.lock())(event);
    }
}
