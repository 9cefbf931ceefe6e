//! Resilient invocation of generative-AI provider calls.
//!
//! [`ResilientInvoker`] runs a caller-supplied async operation, retrying it
//! with exponential backoff while the provider reports quota or rate-limit
//! rejections and propagating every other failure immediately.
//!
//! ```no_run
//! use aitryst_invoker::{InvokeError, ResilientInvoker};
//!
//! # async fn generate() -> Result<String, String> { Ok(String::new()) }
//! # async fn run() -> Result<(), InvokeError<String>> {
//! let invoker: ResilientInvoker = ResilientInvoker::default();
//! let description = invoker.invoke(generate).await?;
//! # let _ = description;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod http;
#[cfg(feature = "logging")]
pub mod logging;
pub mod provider;
pub mod resilient_invoker;
pub mod vertex;

pub use builder::InvokerBuilder;
pub use error::{ConfigError, InvokeError, ProviderError};
pub use http::ErrorBody;
pub use provider::{GenerativeProvider, ResilientProvider};
pub use resilient_invoker::{
    with_retry, Attempt, AttemptOutcome, ErrorClass, Phase, QuotaExceeded, ResilienceConfig,
    ResilientInvoker, RetryClassifier, StructuredQuota,
};
pub use vertex::{VertexClient, VertexConfig};
