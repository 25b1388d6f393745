use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the auth API, classified by what the caller can do
/// about it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401: wrong password, or the access token / refresh cookie is no
    /// longer accepted.
    #[error("Credentials rejected or session expired")]
    Rejected,

    #[error("Not permitted for this account: {0}")]
    Forbidden(String),

    /// 404: on login this means the user does not exist.
    #[error("User or resource not found: {0}")]
    NotFound(String),

    /// 400: e.g. a refresh attempted without a usable cookie.
    #[error("Request refused by the auth server: {0}")]
    BadRequest(String),

    #[error("Too many attempts - wait before trying again")]
    TooManyAttempts,

    #[error("Auth server error: {0}")]
    Server(String),

    #[error("Could not reach the auth server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response from the auth server: {0}")]
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

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = Self::truncate_body(body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Rejected,
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
            StatusCode::TOO_MANY_REQUESTS => ApiError::TooManyAttempts,
            s if s.is_server_error() => ApiError::Server(body),
            s => ApiError::InvalidResponse(format!("status {}: {}", s, body)),
        }
    }

    /// HTTP status this error was built from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::BadRequest(_) => Some(400),
            ApiError::TooManyAttempts => Some(429),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Server(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}
