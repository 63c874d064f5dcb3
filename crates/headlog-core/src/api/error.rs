use serde::Deserialize;
use thiserror::Error;

/// Shown when a failure carries no message we know how to read.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload shape returned by the journal API: `{ "detail": { "msg": "..." } }`
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    msg: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// The server's `detail.msg`, when the error body carried one.
    pub fn detail_message(&self) -> Option<String> {
        let body = match self {
            ApiError::AccessDenied(body)
            | ApiError::Unauthorized(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body) => body.as_str(),
            ApiError::InvalidResponse(text) => match text.split_once(": ") {
                Some((_, body)) => body,
                None => return None,
            },
            ApiError::InvalidRequest(reason) => return Some(reason.clone()),
            ApiError::RateLimited | ApiError::NetworkError(_) => return None,
        };

        serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.detail)
            .and_then(|detail| detail.msg)
    }
}

/// Best-effort human-readable message for a failed request.
///
/// Falls back to [`GENERIC_ERROR_MESSAGE`] when the failure is not an
/// [`ApiError`] or its body does not have the `detail.msg` shape.
pub fn user_message(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::detail_message)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}
