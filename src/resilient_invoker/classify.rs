use std::fmt::Display;

use crate::error::ProviderError;

/// Substring Google puts in quota rejections. Matched case-sensitively.
pub const QUOTA_EXCEEDED_MARKER: &str = "Quota exceeded";
/// Google RPC status attached to 429 responses.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

const TOO_MANY_REQUESTS: u16 = 429;

/// Whether a failed attempt may be retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable,
    Fatal,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        self == ErrorClass::Retryable
    }
}

/// Decides, per error, whether the invoker retries.
///
/// Plain closures `Fn(&E) -> ErrorClass` implement this trait, so callers can
/// classify on whatever structure their error type exposes.
pub trait RetryClassifier<E: ?Sized>: Send + Sync {
    fn classify(&self, err: &E) -> ErrorClass;
}

impl<E: ?Sized, F> RetryClassifier<E> for F
where
    F: Fn(&E) -> ErrorClass + Send + Sync,
{
    fn classify(&self, err: &E) -> ErrorClass {
        self(err)
    }
}

/// Message-based classification: retryable iff the rendered error contains
/// [`QUOTA_EXCEEDED_MARKER`].
///
/// This breaks silently if the provider rewords or localizes its message.
/// Prefer [`StructuredQuota`] when the error carries a status.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuotaExceeded;

impl<E: Display + ?Sized> RetryClassifier<E> for QuotaExceeded {
    fn classify(&self, err: &E) -> ErrorClass {
        if err.to_string().contains(QUOTA_EXCEEDED_MARKER) {
            ErrorClass::Retryable
        } else {
            ErrorClass::Fatal
        }
    }
}

/// Status-based classification for [`ProviderError`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredQuota;

impl RetryClassifier<ProviderError> for StructuredQuota {
    fn classify(&self, err: &ProviderError) -> ErrorClass {
        err.error_class()
    }
}

impl ProviderError {
    /// 429 or `RESOURCE_EXHAUSTED` is retryable. Any other status or code
    /// falls back to the message substring, so a quota message is retried
    /// whatever status it arrives with.
    pub fn error_class(&self) -> ErrorClass {
        let rate_limited = self.status == Some(TOO_MANY_REQUESTS)
            || self.code.as_deref() == Some(RESOURCE_EXHAUSTED);
        if rate_limited {
            return ErrorClass::Retryable;
        }
        QuotaExceeded.classify(self)
    }
}
