//! Test items and the operation shapes they accept.
//!
//! Operations come in two shapes:
//! - async: `|| async { ... }` returning an [`OpResult`]
//! - callback: [`Operation::callback`] with a closure that receives a [`Done`] handle and completes it later
//!
//! The shape is resolved once, at registration, and adapted into a single stored form ([`TestFn`]) so the run
//! loop never has to look at it again.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;

use crate::errors::{BoxError, SuiteError, SuiteResult};
use crate::timeout::Timeout;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a user operation returns.
pub type OpResult = Result<(), BoxError>;

/// Stored, adapted form of an operation.
pub(crate) type TestFn = Box<dyn FnOnce() -> BoxFuture<'static, SuiteResult<()>> + Send>;

/// An operation as handed to registration, before adaptation.
pub enum Operation {
    Async(Box<dyn FnOnce() -> BoxFuture<'static, OpResult> + Send>),
    Callback(Box<dyn FnOnce(Done) + Send>),
}

impl Operation {
    /// Wrap a completion-callback style operation.
    ///
    /// The closure is invoked with a [`Done`] handle and may complete it synchronously or hand it off to another
    /// task. Dropping the handle without completing it fails the item with [`SuiteError::CallbackDropped`].
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(Done) + Send + 'static,
    {
        Operation::Callback(Box::new(f))
    }

    pub(crate) fn into_test_fn(self) -> TestFn {
        match self {
            Operation::Async(f) => Box::new(move || -> BoxFuture<'static, SuiteResult<()>> {
                Box::pin(async move { f().await.map_err(SuiteError::Failed) })
            }),
            Operation::Callback(f) => Box::new(move || -> BoxFuture<'static, SuiteResult<()>> {
                Box::pin(async move {
                    let (tx, rx) = oneshot::channel();
                    f(Done { tx });
                    match rx.await {
                        Ok(outcome) => outcome.map_err(SuiteError::Failed),
                        Err(_) => Err(SuiteError::CallbackDropped),
                    }
                })
            }),
        }
    }
}

/// Anything registration accepts as an operation.
pub trait IntoOperation {
    fn into_operation(self) -> Operation;
}

impl IntoOperation for Operation {
    fn into_operation(self) -> Operation {
        self
    }
}

impl<F, Fut> IntoOperation for F
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = OpResult> + Send + 'static,
{
    fn into_operation(self) -> Operation {
        Operation::Async(Box::new(move || -> BoxFuture<'static, OpResult> { Box::pin(self()) }))
    }
}

/// Completion handle passed to callback-style operations.
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<OpResult>,
}

impl Done {
    pub fn pass(self) {
        self.finish::<BoxError>(Ok(()));
    }

    pub fn fail(self, error: impl Into<BoxError>) {
        self.finish(Err(error));
    }

    /// Complete with an `(error, result)`-style outcome.
    pub fn finish<E: Into<BoxError>>(self, outcome: Result<(), E>) {
        // The receiver is gone once the item has timed out; the late result is discarded.
        let _ = self.tx.send(outcome.map_err(Into::into));
    }
}

/// Per-item options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestOptions {
    /// `None` falls back to the suite's default timeout.
    pub timeout: Option<Timeout>,
}

impl TestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this item
    pub fn with_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Let this item run for as long as it needs
    pub fn without_timeout(mut self) -> Self {
        self.timeout = Some(Timeout::Disabled);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Section,
    Inline,
}

/// One unit of work in a worklist. Discarded once executed.
pub(crate) struct TestCase {
    pub kind: ItemKind,
    /// Empty for inline items.
    pub name: String,
    pub run: TestFn,
    pub timeout: Timeout,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn run(op: impl IntoOperation) -> SuiteResult<()> {
        (op.into_operation().into_test_fn())().await
    }

    #[tokio::test]
    async fn async_operation_success() {
        assert!(run(|| async { Ok(()) }).await.is_ok());
    }

    #[tokio::test]
    async fn async_operation_error_becomes_failed() {
        let err = run(|| async { Err(BoxError::from("bad")) }).await.unwrap_err();
        assert!(matches!(err, SuiteError::Failed(_)));
        assert_eq!(err.to_string(), "bad");
    }

    #[tokio::test]
    async fn callback_completed_synchronously() {
        assert!(run(Operation::callback(|done| done.pass())).await.is_ok());
    }

    #[tokio::test]
    async fn callback_completed_from_another_task() {
        let op = Operation::callback(|done| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                done.fail("late failure");
            });
        });
        assert_eq!(run(op).await.unwrap_err().to_string(), "late failure");
    }

    #[tokio::test]
    async fn callback_finish_takes_a_result() {
        let op = Operation::callback(|done| done.finish(Err::<(), _>(std::io::Error::other("io"))));
        assert_eq!(run(op).await.unwrap_err().to_string(), "io");
    }

    #[tokio::test]
    async fn dropped_callback_fails() {
        let err = run(Operation::callback(|_done| {})).await.unwrap_err();
        assert!(matches!(err, SuiteError::CallbackDropped));
    }

    #[test]
    fn options_builder() {
        assert_eq!(TestOptions::new().timeout, None);
        assert_eq!(TestOptions::new().without_timeout().timeout, Some(Timeout::Disabled));
        let opts = TestOptions::new().with_timeout(std::time::Duration::from_secs(1));
        assert_eq!(opts.timeout, Some(Timeout::After(std::time::Duration::from_secs(1))));
    }
}
