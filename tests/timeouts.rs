//! Timeout behaviour against a paused clock

use std::sync::{Arc, Mutex};
use std::time::Duration;

use testit::{BoxError, Operation, Suite, SuiteConfig, SuiteError, Timeout, TestOptions};
use tokio::time::{Instant, sleep};

type Log = Arc<Mutex<Vec<String>>>;

fn record(suite: &Suite) -> Log {
    let log = Log::default();
    let sink = log.clone();
    suite.subscribe(move |event| sink.lock().unwrap().push(event.to_string()));
    log
}

#[tokio::test(start_paused = true)]
async fn test_slow_section_fails_when_its_timeout_elapses() {
    let suite = Suite::new();
    let log = record(&suite);
    suite
        .register_section(
            "slow",
            || async {
                sleep(Duration::from_secs(30)).await;
                Ok::<(), BoxError>(())
            },
            TestOptions::new().with_timeout(Duration::from_secs(1)),
        )
        .unwrap();

    let started = Instant::now();
    let err = suite.run().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, SuiteError::TimedOut(d) if d == Duration::from_secs(1)));
    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2), "{elapsed:?}");
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "suite-start",
            "start slow",
            "fail slow: operation timed out after 1s",
            "end slow",
            "suite-fail: operation timed out after 1s",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_disabled_timeout_never_fires() {
    let suite = Suite::with_config(SuiteConfig::new().with_default_timeout(Duration::from_millis(10)));
    suite
        .register_section(
            "patient",
            || async {
                sleep(Duration::from_secs(3600)).await;
                Ok::<(), BoxError>(())
            },
            TestOptions::new().without_timeout(),
        )
        .unwrap();

    suite.run().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_late_completion_after_timeout_is_ignored() {
    let suite = Suite::new();
    let log = record(&suite);
    suite
        .register_inline(
            Operation::callback(|done| {
                tokio::spawn(async move {
                    sleep(Duration::from_secs(5)).await;
                    done.pass();
                });
            }),
            TestOptions::new().with_timeout(Timeout::After(Duration::from_secs(1))),
        )
        .unwrap();

    assert!(suite.run().await.is_err());
    let at_failure = log.lock().unwrap().clone();

    sleep(Duration::from_secs(10)).await;

    assert_eq!(*log.lock().unwrap(), at_failure);
    assert_eq!(at_failure.last().map(String::as_str), Some("suite-fail: operation timed out after 1s"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_per_item_not_per_subtree() {
    let suite = Suite::new();
    let s = suite.clone();
    let per_item = TestOptions::new().with_timeout(Duration::from_secs(2));
    suite
        .register_section(
            "parent",
            move || async move {
                for name in ["a", "b", "c"] {
                    s.register_section(
                        name,
                        || async {
                            sleep(Duration::from_millis(1500)).await;
                            Ok::<(), BoxError>(())
                        },
                        per_item,
                    )?;
                }
                Ok::<(), BoxError>(())
            },
            per_item,
        )
        .unwrap();

    suite.run().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_children_of_a_timed_out_section_never_run() {
    let suite = Suite::new();
    let ran_child = Arc::new(Mutex::new(false));

    let (s, flag) = (suite.clone(), ran_child.clone());
    suite
        .register_section(
            "stalls",
            move || async move {
                s.register_inline(
                    move || async move {
                        *flag.lock().unwrap() = true;
                        Ok::<(), BoxError>(())
                    },
                    TestOptions::default(),
                )?;
                sleep(Duration::from_secs(30)).await;
                Ok::<(), BoxError>(())
            },
            TestOptions::new().with_timeout(Duration::from_secs(1)),
        )
        .unwrap();

    let err = suite.run().await.unwrap_err();
    assert!(err.is_timeout());
    assert!(!*ran_child.lock().unwrap());
}
