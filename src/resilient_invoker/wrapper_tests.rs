use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::resilient_invoker::{AttemptOutcome, ErrorClass, Phase};

const QUOTA: &str = "Quota exceeded for requests";

type Outcome = Result<&'static str, &'static str>;

/// Operation that replays `script`, repeating the last entry once it runs out.
/// The counter tracks attempts that actually started running.
fn scripted(script: Vec<Outcome>) -> (Arc<AtomicUsize>, impl FnMut() -> BoxFuture<'static, Outcome>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let script = Arc::new(script);
    let op = move || {
        let counter = counter.clone();
        let script = script.clone();
        async move {
            let idx = counter.fetch_add(1, Ordering::SeqCst);
            match script.get(idx) {
                Some(outcome) => *outcome,
                None => *script.last().unwrap(),
            }
        }
        .boxed()
    };
    (calls, op)
}

fn default_invoker() -> ResilientInvoker {
    ResilientInvoker::default()
}

fn recording_invoker(cfg: ResilienceConfig) -> (Arc<Mutex<Vec<Attempt>>>, ResilientInvoker) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let invoker = ResilientInvoker::new(cfg).with_observer(move |attempt| {
        sink.lock().unwrap().push(attempt.clone());
    });
    (seen, invoker)
}

fn assert_elapsed(start: Instant, expected_ms: u64) {
    let elapsed = start.elapsed();
    let expected = Duration::from_millis(expected_ms);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_retryable_then_success_returns_value() {
    let (calls, op) = scripted(vec![Err(QUOTA), Ok("image")]);
    let start = Instant::now();

    let result = default_invoker().invoke(op).await;

    assert_eq!(result.unwrap(), "image");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_elapsed(start, 2_000);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_first_attempt_has_no_delay() {
    let (calls, op) = scripted(vec![Ok("text")]);
    let start = Instant::now();

    let result = default_invoker().invoke(op).await;

    assert_eq!(result.unwrap(), "text");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_elapsed(start, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_propagates_verbatim() {
    let (calls, op) = scripted(vec![Err("Invalid argument"), Ok("never")]);
    let start = Instant::now();

    let result = default_invoker().invoke(op).await;

    match result {
        Err(InvokeError::Operation(err)) => assert_eq!(err, "Invalid argument"),
        other => panic!("expected operation error, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_elapsed(start, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_after_retry_stops_immediately() {
    let (calls, op) = scripted(vec![Err(QUOTA), Err("permission denied"), Ok("never")]);
    let start = Instant::now();

    let result = default_invoker().invoke(op).await;

    assert!(matches!(result, Err(InvokeError::Operation("permission denied"))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_elapsed(start, 2_000);
}

#[tokio::test(start_paused = true)]
async fn test_always_retryable_exhausts_budget() {
    let (calls, op) = scripted(vec![Err(QUOTA)]);
    let start = Instant::now();

    let result = default_invoker().invoke(op).await;

    match result {
        Err(InvokeError::RetryExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error, QUOTA);
        }
        other => panic!("expected retry exhaustion, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_elapsed(start, 6_000);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget_exhausts_without_delay() {
    let (calls, op) = scripted(vec![Err(QUOTA)]);
    let start = Instant::now();

    let result = ResilientInvoker::new(ResilienceConfig::with_max_retries(1))
        .invoke(op)
        .await;

    assert!(matches!(
        result,
        Err(InvokeError::RetryExhausted { attempts: 1, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_elapsed(start, 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_still_runs_once() {
    let (calls, op) = scripted(vec![Ok("ok")]);

    let result = ResilientInvoker::new(ResilienceConfig::with_max_retries(0))
        .invoke(op)
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_backoff_schedule() {
    let (seen, invoker) = recording_invoker(ResilienceConfig::defaults());
    let (_, op) = scripted(vec![Err(QUOTA)]);

    let _ = invoker.invoke(op).await;

    let seen = seen.lock().unwrap();
    let delays: Vec<_> = seen.iter().map(|a| a.delay_before_next).collect();
    assert_eq!(
        delays,
        vec![
            Some(Duration::from_millis(2_000)),
            Some(Duration::from_millis(4_000)),
            None,
        ]
    );
    let numbers: Vec<_> = seen.iter().map(|a| a.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(seen
        .iter()
        .all(|a| a.outcome == AttemptOutcome::RetryableFailure));
    assert_eq!(seen.last().unwrap().next_phase(), Phase::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_observer_records_success_outcome() {
    let (seen, invoker) = recording_invoker(ResilienceConfig::defaults());
    let (_, op) = scripted(vec![Err(QUOTA), Ok("done")]);

    invoker.invoke(op).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].outcome, AttemptOutcome::Success);
    assert_eq!(seen[1].next_phase(), Phase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_jitter_stays_within_half_of_delay() {
    let cfg = ResilienceConfig {
        jitter: true,
        ..ResilienceConfig::defaults()
    };
    let (seen, invoker) = recording_invoker(cfg);
    let (_, op) = scripted(vec![Err(QUOTA)]);

    let _ = invoker.invoke(op).await;

    let seen = seen.lock().unwrap();
    let first = seen[0].delay_before_next.unwrap();
    let second = seen[1].delay_before_next.unwrap();
    assert!(first > Duration::from_millis(1_000) && first <= Duration::from_millis(2_000));
    assert!(second > Duration::from_millis(2_000) && second <= Duration::from_millis(4_000));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });
    let (calls, op) = scripted(vec![Err(QUOTA)]);
    let start = Instant::now();

    let result = default_invoker()
        .invoke_with_cancel(&token, op)
        .await;

    assert!(matches!(result, Err(InvokeError::Cancelled { attempts: 1 })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_elapsed(start, 500);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_operation() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<(), InvokeError<&str>> = default_invoker()
        .invoke_with_cancel(&token, || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
        })
        .await;

    assert!(matches!(result, Err(InvokeError::Cancelled { attempts: 0 })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_token_skips_operation() {
    let token = CancellationToken::new();
    token.cancel();
    let (calls, op) = scripted(vec![Ok("never")]);

    let result = default_invoker()
        .invoke_with_cancel(&token, op)
        .await;

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_uncancelled_token_behaves_like_invoke() {
    let token = CancellationToken::new();
    let (calls, op) = scripted(vec![Err(QUOTA), Ok("video")]);

    let result = default_invoker()
        .invoke_with_cancel(&token, op)
        .await;

    assert_eq!(result.unwrap(), "video");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_invocations_are_independent() {
    let invoker = default_invoker();
    let (failing_calls, failing) = scripted(vec![Err(QUOTA)]);
    let (recovering_calls, recovering) = scripted(vec![Err(QUOTA), Ok("ok")]);
    let start = Instant::now();

    let recovering = async {
        let result = invoker.invoke(recovering).await;
        (result, start.elapsed())
    };
    let (failed, (recovered, recovered_after)) =
        futures::join!(invoker.invoke(failing), recovering);

    assert!(failed.unwrap_err().is_retry_exhausted());
    assert_eq!(failing_calls.load(Ordering::SeqCst), 3);
    assert_eq!(recovered.unwrap(), "ok");
    assert_eq!(recovering_calls.load(Ordering::SeqCst), 2);
    assert!(recovered_after < Duration::from_millis(2_050));
    assert_elapsed(start, 6_000);
}

#[tokio::test(start_paused = true)]
async fn test_custom_classifier_controls_retries() {
    #[derive(Debug, PartialEq)]
    enum UpstreamError {
        Busy,
        Rejected,
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let invoker = default_invoker().with_classifier(|err: &UpstreamError| match err {
        UpstreamError::Busy => ErrorClass::Retryable,
        UpstreamError::Rejected => ErrorClass::Fatal,
    });

    let result: Result<(), _> = invoker
        .invoke(|| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(UpstreamError::Busy)
                } else {
                    Err(UpstreamError::Rejected)
                }
            }
        })
        .await;

    assert!(matches!(
        result,
        Err(InvokeError::Operation(UpstreamError::Rejected))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_with_retry_uses_default_schedule() {
    let (calls, op) = scripted(vec![Err(QUOTA), Err(QUOTA), Ok("done")]);
    let start = Instant::now();

    let result = with_retry(op, 3).await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_elapsed(start, 6_000);
}

#[test]
fn test_delay_for_matches_config() {
    let invoker = default_invoker().with_label("imagen");
    assert_eq!(invoker.delay_for(1), Duration::from_millis(2_000));
    assert_eq!(invoker.delay_for(2), Duration::from_millis(4_000));
    assert_eq!(invoker.label(), "imagen");
    assert_eq!(invoker.config().max_retries, 3);
}
