use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Login failed. Please check your credentials.")]
    AuthenticationFailed,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull a human-readable message out of an error body.
    /// The remote API answers errors with `{"message": "..."}` most of the time.
    pub(crate) fn server_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| Self::truncate_body(body))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::SessionExpired,
            code => ApiError::RequestFailed {
                status: code,
                message: Self::server_message(body),
            },
        }
    }

    /// True when the caller should send the user back to the login view
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::AuthenticationRequired | ApiError::SessionExpired
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired => Some(401),
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
