use thiserror::Error;

/// Postgres `insufficient_privilege`, raised when row-level security rejects a write.
pub const PERMISSION_DENIED_CODE: &str = "42501";

/// Errors returned by [`crate::BackendClient`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. `code`, `details` and
    /// `hint` come from its JSON error body when it sent one.
    #[error("backend error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response that is missing something the protocol promises.
    #[error("unexpected backend response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("operation requires the service role key, which is not configured")]
    MissingServiceKey,
}

impl BackendError {
    /// `true` when the backend refused the operation for lack of privileges.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            BackendError::Api {
                status,
                code,
                message,
                ..
            } => {
                code.as_deref() == Some(PERMISSION_DENIED_CODE)
                    || message.to_lowercase().contains("permission denied")
                    || matches!(status, 401 | 403)
            }
            _ => false,
        }
    }

    /// Backend error code (Postgres SQLSTATE or `PGRST*`), if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        match self {
            BackendError::Api { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// The backend's own message for API errors, or the display text otherwise.
    #[must_use]
    pub fn backend_message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
