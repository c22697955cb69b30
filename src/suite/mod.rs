//! The suite engine.
//!
//! A [`Suite`] owns one *current* worklist plus a stack of suspended ancestor worklists. Registration appends to
//! the current worklist; while a section's operation runs, the current worklist is a fresh one collecting that
//! section's children. The run loop consumes the current worklist front to back and pops back to the enclosing
//! worklist when it is exhausted, so execution is a pre-order walk of a tree that is discovered as it runs, with
//! no recursion per nesting level.
//!
//! ## Invariants
//!
//! - Exactly one worklist is current; the stack holds every suspended ancestor. Stack depth equals the nesting
//!   depth of the section whose children are running.
//! - The run is complete iff the current worklist is empty and the stack is empty.
//! - Only one operation is in flight at a time. Locks are never held across an `.await` or while listeners run.
//! - The first failure is the only failure: it emits the item's `*-fail` / `*-end` pair, then `suite-fail`, and
//!   nothing after it executes.

// Enforce explicit error handling - no panicking in the engine
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod events;
pub mod item;

use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::config::SuiteConfig;
use crate::errors::{SuiteError, SuiteResult};
use crate::reporter::Reporter;
use crate::timeout::{Timeout, with_timeout};

use events::{EventKind, ListenerId, Listeners, SuiteEvent};
use item::{IntoOperation, ItemKind, TestCase, TestFn, TestOptions};

type Worklist = VecDeque<TestCase>;

/// Resumption state for a suspended ancestor worklist.
struct StackFrame {
    /// The ancestor's remaining items; its cursor sits just past the section being run.
    worklist: Worklist,
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Status {
    #[default]
    Idle,
    Running,
    Finished,
}

#[derive(Default)]
struct RunState {
    status: Status,
    current: Worklist,
    stack: Vec<StackFrame>,
    /// Kind of the item whose operation is in flight.
    executing: Option<ItemKind>,
}

struct Inner {
    config: SuiteConfig,
    state: Mutex<RunState>,
    listeners: Mutex<Listeners>,
}

/// A nested test suite.
///
/// `Suite` is a cheap handle: clone it into a section's operation to register that section's children.
///
/// ```rust,no_run
/// use testit::{Suite, TestOptions};
///
/// # async fn demo() -> testit::SuiteResult<()> {
/// let suite = Suite::new();
/// let s = suite.clone();
/// suite.register_section("parser", move || async move {
///     s.register_section("empty input", || async { Ok(()) }, TestOptions::default())?;
///     Ok(())
/// }, TestOptions::default())?;
/// suite.run().await
/// # }
/// ```
#[derive(Clone)]
pub struct Suite {
    inner: Arc<Inner>,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl Suite {
    pub fn new() -> Self {
        Self::with_config(SuiteConfig::default())
    }

    pub fn with_config(config: SuiteConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(RunState::default()),
                listeners: Mutex::new(Listeners::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.inner.config
    }

    /// Current section nesting depth (0 at the top level).
    pub fn depth(&self) -> usize {
        self.inner.state.lock().stack.len()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a named section.
    ///
    /// Before [`run`](Self::run) this appends to the top-level worklist. From inside a running section's operation
    /// it appends to that section's children, which run after the operation succeeds and before the section's next
    /// sibling.
    ///
    /// ## Errors
    ///
    /// - [`SuiteError::EmptySectionName`] if `name` is empty. An empty name is reserved for inline items, so
    ///   unnamed work goes through [`register_inline`](Self::register_inline) rather than an empty section.
    /// - [`SuiteError::InlineNesting`] if called while an inline block is executing
    /// - [`SuiteError::Finished`] if the run has already completed
    pub fn register_section(
        &self,
        name: impl Into<String>,
        operation: impl IntoOperation,
        options: TestOptions,
    ) -> SuiteResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(SuiteError::EmptySectionName);
        }
        self.enqueue(ItemKind::Section, name, operation.into_operation().into_test_fn(), options)
    }

    /// Register an unnamed inline block.
    ///
    /// ## Errors
    ///
    /// Same conditions as [`register_section`](Self::register_section), minus the name check.
    pub fn register_inline(&self, operation: impl IntoOperation, options: TestOptions) -> SuiteResult<()> {
        self.enqueue(ItemKind::Inline, String::new(), operation.into_operation().into_test_fn(), options)
    }

    fn enqueue(&self, kind: ItemKind, name: String, run: TestFn, options: TestOptions) -> SuiteResult<()> {
        let label = || match kind {
            ItemKind::Section => name.clone(),
            ItemKind::Inline => "inline block".to_string(),
        };

        let mut state = self.inner.state.lock();
        if state.status == Status::Finished {
            return Err(SuiteError::Finished(label()));
        }
        if state.executing == Some(ItemKind::Inline) {
            return Err(SuiteError::InlineNesting(label()));
        }

        let timeout = options.timeout.unwrap_or(self.inner.config.default_timeout);
        state.current.push_back(TestCase { kind, name, run, timeout });
        Ok(())
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Subscribe to one kind of event.
    ///
    /// Listeners run synchronously on the run loop, in subscription order. A listener may subscribe, unsubscribe
    /// (itself included) or register items from inside its callback; subscription changes apply from the next
    /// event.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&SuiteEvent<'_>) + Send + 'static,
    {
        self.inner.listeners.lock().add(Some(kind), Box::new(listener))
    }

    /// Subscribe to every event.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&SuiteEvent<'_>) + Send + 'static,
    {
        self.inner.listeners.lock().add(None, Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.listeners.lock().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Attach a [`Reporter`] to the event stream.
    pub fn add_reporter<R: Reporter + 'static>(&self, mut reporter: R) -> ListenerId {
        self.subscribe(move |event| reporter.on_event(event))
    }

    fn emit(&self, event: SuiteEvent<'_>) {
        let targets = self.inner.listeners.lock().matching(event.kind());
        events::dispatch(&targets, &event);
    }

    // ========================================================================
    // Run loop
    // ========================================================================

    /// Run every registered item, including items registered while running.
    ///
    /// Resolves once the whole tree has passed, or with the first failure. Must be awaited inside a tokio
    /// runtime; each operation runs as its own task so a panic fails the item instead of the runner.
    ///
    /// ## Errors
    ///
    /// - [`SuiteError::AlreadyStarted`] if the suite has been run before (a suite runs once)
    /// - the first item failure otherwise
    #[tracing::instrument(skip_all, fields(suite = %self.inner.config.name))]
    pub async fn run(&self) -> SuiteResult<()> {
        {
            let mut state = self.inner.state.lock();
            if state.status != Status::Idle {
                tracing::warn!("suite run requested twice");
                return Err(SuiteError::AlreadyStarted(self.inner.config.name.clone()));
            }
            state.status = Status::Running;
        }

        self.emit(SuiteEvent::SuiteStart);
        loop {
            let (ended, next) = self.advance();
            for name in &ended {
                tracing::debug!(section = %name, depth = self.depth(), "section children done");
                self.emit(SuiteEvent::EndSection { name });
                self.emit(SuiteEvent::End { name });
            }

            let Some(item) = next else {
                self.finish();
                self.emit(SuiteEvent::SuitePass);
                return Ok(());
            };

            let outcome = match item.kind {
                ItemKind::Inline => self.run_inline(item).await,
                ItemKind::Section => self.run_section(item).await,
            };

            if let Err(error) = outcome {
                self.finish();
                self.emit(SuiteEvent::SuiteFail { error: &error });
                return Err(error);
            }
        }
    }

    /// Unwind exhausted worklists and take the next item, if any.
    ///
    /// Returns the names of the sections whose children have all run, innermost first.
    fn advance(&self) -> (Vec<String>, Option<TestCase>) {
        let mut state = self.inner.state.lock();
        let mut ended = Vec::new();
        loop {
            if let Some(item) = state.current.pop_front() {
                return (ended, Some(item));
            }
            match state.stack.pop() {
                Some(frame) => {
                    state.current = frame.worklist;
                    ended.push(frame.name);
                }
                None => return (ended, None),
            }
        }
    }

    async fn run_inline(&self, item: TestCase) -> SuiteResult<()> {
        tracing::trace!(depth = self.depth(), "running inline block");
        self.emit(SuiteEvent::RunStart);
        self.inner.state.lock().executing = Some(ItemKind::Inline);
        let outcome = execute(item.run, item.timeout).await;
        self.inner.state.lock().executing = None;

        match outcome {
            Ok(()) => {
                self.emit(SuiteEvent::RunPass);
                self.emit(SuiteEvent::RunEnd);
                Ok(())
            }
            Err(error) => {
                self.emit(SuiteEvent::RunFail { error: &error });
                self.emit(SuiteEvent::RunEnd);
                Err(error)
            }
        }
    }

    async fn run_section(&self, item: TestCase) -> SuiteResult<()> {
        let TestCase { name, run, timeout, .. } = item;
        let depth = {
            let mut state = self.inner.state.lock();
            let parent = std::mem::take(&mut state.current);
            state.stack.push(StackFrame {
                worklist: parent,
                name: name.clone(),
            });
            state.executing = Some(ItemKind::Section);
            state.stack.len()
        };

        tracing::debug!(section = %name, depth, "section started");
        self.emit(SuiteEvent::Start { name: &name });
        let outcome = execute(run, timeout).await;

        let has_children = {
            let mut state = self.inner.state.lock();
            state.executing = None;
            let has_children = !state.current.is_empty();
            if outcome.is_ok() && !has_children {
                // Leaf section: resume the parent straight away.
                if let Some(frame) = state.stack.pop() {
                    state.current = frame.worklist;
                }
            }
            has_children
        };

        match outcome {
            Ok(()) if has_children => {
                self.emit(SuiteEvent::StartSection { name: &name });
                Ok(())
            }
            Ok(()) => {
                self.emit(SuiteEvent::Pass { name: &name });
                self.emit(SuiteEvent::End { name: &name });
                Ok(())
            }
            Err(error) => {
                self.emit(SuiteEvent::Fail { name: &name, error: &error });
                self.emit(SuiteEvent::End { name: &name });
                Err(error)
            }
        }
    }

    /// Mark the run finished and drop everything still queued.
    fn finish(&self) {
        let mut state = self.inner.state.lock();
        state.status = Status::Finished;
        state.current.clear();
        state.stack.clear();
    }
}

/// Run one operation as its own task, under `limit`.
///
/// The task is aborted if the deadline wins, so a timed-out operation never gets to report late.
async fn execute(run: TestFn, limit: Timeout) -> SuiteResult<()> {
    let task = AbortOnDrop(tokio::spawn(async move { run().await }));
    with_timeout(
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(join_failure(join_error)),
            }
        },
        limit,
    )
    .await
}

fn join_failure(error: JoinError) -> SuiteError {
    if error.is_panic() {
        SuiteError::Panicked(panic_message(error.into_panic()))
    } else {
        SuiteError::Cancelled
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Join handle that aborts its task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}
