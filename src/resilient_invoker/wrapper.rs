use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::InvokeError;

use super::attempt::Attempt;
use super::classify::{QuotaExceeded, RetryClassifier};
use super::config::ResilienceConfig;

/// Callback receiving every [`Attempt`] as it completes.
pub type AttemptObserver = dyn Fn(&Attempt) + Send + Sync;

const DEFAULT_LABEL: &str = "invoke";

/// Runs a caller-supplied async operation with bounded retries and
/// exponential backoff.
///
/// The invoker holds only immutable configuration, so one instance can be
/// shared across concurrent invocations; each call keeps its own attempt
/// count and never sees another call's failures.
#[derive(Clone)]
pub struct ResilientInvoker<C = QuotaExceeded> {
    cfg: ResilienceConfig,
    classifier: C,
    observer: Option<Arc<AttemptObserver>>,
    label: String,
}

impl<C: fmt::Debug> fmt::Debug for ResilientInvoker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientInvoker")
            .field("cfg", &self.cfg)
            .field("classifier", &self.classifier)
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .field("label", &self.label)
            .finish()
    }
}

impl ResilientInvoker<QuotaExceeded> {
    /// Creates an invoker that retries on "Quota exceeded" messages.
    pub fn new(cfg: ResilienceConfig) -> Self {
        Self {
            cfg,
            classifier: QuotaExceeded,
            observer: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl Default for ResilientInvoker<QuotaExceeded> {
    fn default() -> Self {
        Self::new(ResilienceConfig::defaults())
    }
}

impl<C> ResilientInvoker<C> {
    /// Replaces the retry classifier.
    pub fn with_classifier<C2>(self, classifier: C2) -> ResilientInvoker<C2> {
        ResilientInvoker {
            cfg: self.cfg,
            classifier,
            observer: self.observer,
            label: self.label,
        }
    }

    /// Registers a callback that receives every [`Attempt`] as it completes,
    /// in addition to the log line.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Attempt) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Name used as the prefix of log lines.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.cfg
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Backoff applied after the 1-based `attempt`, before jitter.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.cfg.delay_for(attempt)
    }

    /// Runs `op` until it succeeds, fails fatally, or the retry budget is
    /// consumed.
    pub async fn invoke<F, Fut, T, E>(&self, op: F) -> Result<T, InvokeError<E>>
    where
        C: RetryClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(op, None).await
    }

    /// Same as [`invoke`](Self::invoke), but aborts with
    /// [`InvokeError::Cancelled`] once `token` fires, whether the invoker is
    /// inside an attempt or waiting out a backoff delay.
    pub async fn invoke_with_cancel<F, Fut, T, E>(
        &self,
        token: &CancellationToken,
        op: F,
    ) -> Result<T, InvokeError<E>>
    where
        C: RetryClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(op, Some(token)).await
    }

    async fn run<F, Fut, T, E>(
        &self,
        mut op: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, InvokeError<E>>
    where
        C: RetryClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // A zero budget would never call the operation; treat it as one attempt.
        let max_attempts = self.cfg.max_retries.max(1);
        let mut number = 1usize;

        loop {
            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(self.cancelled(number - 1)),
                    res = op() => res,
                },
                None => op().await,
            };

            let err = match result {
                Ok(value) => {
                    self.record(Attempt::succeeded(number), max_attempts);
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !self.classifier.classify(&err).is_retryable() {
                self.record(Attempt::fatal(number), max_attempts);
                return Err(InvokeError::Operation(err));
            }

            if number >= max_attempts {
                self.record(Attempt::retryable(number, None), max_attempts);
                log::warn!(
                    "{}: retry budget exhausted after {number} attempts",
                    self.label
                );
                return Err(InvokeError::RetryExhausted {
                    attempts: number,
                    last_error: err,
                });
            }
            let delay = self.next_delay(number);
            self.record(Attempt::retryable(number, Some(delay)), max_attempts);

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(self.cancelled(number)),
                    _ = sleep(delay) => {}
                },
                None => sleep(delay).await,
            }
            number += 1;
        }
    }

    fn next_delay(&self, attempt: usize) -> Duration {
        let delay = self.cfg.delay_for(attempt);
        if !self.cfg.jitter {
            return delay;
        }
        let millis = delay.as_millis().min(u64::MAX as u128) as u64;
        let span = (millis / 2).max(1);
        let jitter = rand::thread_rng().gen_range(0..span);
        Duration::from_millis(millis.saturating_sub(jitter))
    }

    fn record(&self, attempt: Attempt, max_attempts: usize) {
        match attempt.delay_before_next {
            Some(delay) => log::warn!(
                "{}: attempt {}/{} hit a retryable error, backing off {}ms",
                self.label,
                attempt.number,
                max_attempts,
                delay.as_millis()
            ),
            None => log::debug!(
                "{}: attempt {}/{} finished: {:?}",
                self.label,
                attempt.number,
                max_attempts,
                attempt.outcome
            ),
        }
        if let Some(observer) = &self.observer {
            observer(&attempt);
        }
    }

    fn cancelled<E>(&self, attempts: usize) -> InvokeError<E> {
        log::debug!("{}: cancelled after {attempts} completed attempts", self.label);
        InvokeError::Cancelled { attempts }
    }
}

/// Retries `op` up to `max_retries` times on "Quota exceeded" failures with
/// the default 2s, 4s, ... schedule.
pub async fn with_retry<F, Fut, T, E>(op: F, max_retries: usize) -> Result<T, InvokeError<E>>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    ResilientInvoker::new(ResilienceConfig::with_max_retries(max_retries))
        .invoke(op)
        .await
}

#[cfg(test)]
#[path = "wrapper_tests.rs"]
mod tests;
