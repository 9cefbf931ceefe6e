#[path = "resilient_invoker/config.rs"]
mod config;

#[path = "resilient_invoker/classify.rs"]
mod classify;

#[path = "resilient_invoker/attempt.rs"]
mod attempt;

#[path = "resilient_invoker/wrapper.rs"]
mod wrapper;

pub use attempt::{Attempt, AttemptOutcome, Phase};
pub use classify::{
    ErrorClass, QuotaExceeded, RetryClassifier, StructuredQuota, QUOTA_EXCEEDED_MARKER,
    RESOURCE_EXHAUSTED,
};
pub use config::ResilienceConfig;
pub use wrapper::{with_retry, AttemptObserver, ResilientInvoker};
