use thiserror::Error;

/// Outcome of a failed invocation through [`crate::ResilientInvoker`].
///
/// `Operation` carries the operation's own error untouched, so callers can
/// match on it exactly as if the invoker were not there.
#[derive(Debug, Error)]
pub enum InvokeError<E> {
    /// Non-retryable failure, propagated verbatim on the attempt it happened
    #[error("{0}")]
    Operation(E),
    /// Retry budget consumed while the operation kept failing transiently
    #[error("Retry attempts exhausted after {attempts} tries: {last_error}")]
    RetryExhausted { attempts: usize, last_error: E },
    /// The cancellation token fired during an attempt or a backoff delay
    #[error("Invocation cancelled after {attempts} completed attempts")]
    Cancelled { attempts: usize },
}

impl<E> InvokeError<E> {
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, InvokeError::RetryExhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvokeError::Cancelled { .. })
    }

    /// Number of attempts made, when the invoker tracked it.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            InvokeError::Operation(_) => None,
            InvokeError::RetryExhausted { attempts, .. } | InvokeError::Cancelled { attempts } => {
                Some(*attempts)
            }
        }
    }

    /// Borrows the underlying operation error, if any.
    pub fn inner(&self) -> Option<&E> {
        match self {
            InvokeError::Operation(err) | InvokeError::RetryExhausted { last_error: err, .. } => {
                Some(err)
            }
            InvokeError::Cancelled { .. } => None,
        }
    }

    /// Consumes the error and returns the underlying operation error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            InvokeError::Operation(err) | InvokeError::RetryExhausted { last_error: err, .. } => {
                Some(err)
            }
            InvokeError::Cancelled { .. } => None,
        }
    }
}

/// Failure reported by a generative-AI provider call.
///
/// `status` is the HTTP status when one was received and `code` the
/// provider's symbolic status (e.g. `RESOURCE_EXHAUSTED`). Both are used for
/// retry classification before falling back to the message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} error: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn http(
        provider: impl Into<String>,
        status: u16,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: Some(status),
            code,
            ..Self::new(provider, message)
        }
    }

    /// A rate-limit rejection shaped like Google's 429 responses.
    pub fn quota(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::http(
            provider,
            429,
            Some(crate::resilient_invoker::RESOURCE_EXHAUSTED.to_string()),
            message,
        )
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, format!("network failure: {}", message.into()))
    }

    pub fn decode(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, format!("response decode failure: {}", message.into()))
    }

    /// Replaces the provider name, e.g. after a `?` conversion from a
    /// transport error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }
}

// The conversions below name the failing layer; clients relabel the result
// with their own provider name.

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ProviderError::http("http", status.as_u16(), None, err.to_string()),
            None => ProviderError::network("http", err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::decode(
            "json",
            format!("{} at line {} column {}", err, err.line(), err.column()),
        )
    }
}

/// Invalid invoker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_retries must be greater than 0")]
    ZeroRetries,
    #[error("max_delay_ms ({max}) must not be below base_delay_ms ({base})")]
    DelayCapBelowBase { base: u64, max: u64 },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
