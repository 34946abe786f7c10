use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// ApiError
///
/// The JSON API error taxonomy. Every handler failure is converted into one of
/// these variants at the single-operation granularity and rendered as an
/// `{"error": "..."}` body; there are no retries or partial-failure semantics.
///
/// The admin HTML surface never uses this type: its failures become redirects,
/// re-rendered forms, or plain-text status pages.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ApiError {
    /// Schema rule violation (400). Carries the rule message verbatim.
    #[error("{0}")]
    Validation(String),

    /// Login failure (401). One generic message for both the unknown-email and
    /// wrong-password paths, so the response shape leaks nothing.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token absent from the Authorization header (401).
    #[error("No token")]
    MissingToken,

    /// Bearer token failed signature or expiry checks, or resolves to no
    /// account (401).
    #[error("Invalid token")]
    InvalidToken,

    /// Entity absent by identifier (404).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected failure (500). Details are logged server-side at the point
    /// of conversion; the client only sees a generic message.
    #[error("Server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::MissingToken | ApiError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "database error");
        ApiError::Internal
    }
}
