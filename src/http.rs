//! Translation of invocation failures into HTTP responses for route handlers.

use std::fmt::Display;

use serde::Serialize;

use crate::error::InvokeError;

pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;
pub const STATUS_REQUEST_TIMEOUT: u16 = 408;

/// JSON body returned to clients when a generation call fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Whether trying again later may succeed
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<usize>,
}

impl<E: Display> InvokeError<E> {
    /// Status a route handler should answer with. Exhausted retries map to
    /// 503 so clients can tell "try again later" apart from hard failures.
    pub fn http_status(&self) -> u16 {
        match self {
            InvokeError::Operation(_) => STATUS_INTERNAL_ERROR,
            InvokeError::RetryExhausted { .. } => STATUS_SERVICE_UNAVAILABLE,
            InvokeError::Cancelled { .. } => STATUS_REQUEST_TIMEOUT,
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        let error = match self {
            InvokeError::RetryExhausted { last_error, .. } => {
                format!("Service temporarily unavailable, try again later: {last_error}")
            }
            other => other.to_string(),
        };
        ErrorBody {
            error,
            retryable: !matches!(self, InvokeError::Operation(_)),
            attempts: self.attempts(),
        }
    }
}

#[cfg(feature = "api")]
impl<E: Display> axum::response::IntoResponse for InvokeError<E> {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.http_status())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self.to_error_body())).into_response()
    }
}
