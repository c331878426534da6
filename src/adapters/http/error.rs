//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Domain error codes map to
//! status codes and a JSON body:
//!
//! ```text
//! { "code": "EVENT_FULL", "message": "...", "details": { "seats_available": "2" } }
//! ```
//!
//! Server-side failures (5xx) are logged in full and answered with a generic
//! message; the `verbose_errors` feature flag swaps the real message back in.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Wire format for all error responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }
}

/// Original message of a sanitized 5xx response, kept for `verbose_errors`.
#[derive(Debug, Clone)]
pub struct SuppressedDetail(pub ErrorResponse);

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        Self(DomainError::validation(field, message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(DomainError::new(ErrorCode::Unauthorized, message))
    }

    pub fn forbidden() -> Self {
        Self(DomainError::new(
            ErrorCode::Forbidden,
            "You do not have permission to perform this action",
        ))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    use ErrorCode::*;
    match code {
        ValidationFailed | InvalidWebhookSignature => StatusCode::BAD_REQUEST,

        MemberNotFound | AdminUserNotFound | EventNotFound | RsvpNotFound | PaymentNotFound
        | GalleryImageNotFound | ReferralSourceNotFound | ContactMessageNotFound => {
            StatusCode::NOT_FOUND
        }

        MemberExists | AdminUserExists | ReferralSourceExists | ReferralSourceInUse
        | AlreadyRsvped | EventFull | EventHasRsvps | MembershipActive | LastAdministrator
        | InvalidStateTransition | EventClosed | PaymentNotRefundable | ReceiptUnavailable => {
            StatusCode::CONFLICT
        }

        InvalidCredentials | Unauthorized => StatusCode::UNAUTHORIZED,
        Forbidden => StatusCode::FORBIDDEN,
        RateLimited => StatusCode::TOO_MANY_REQUESTS,

        PaymentProviderError | StorageError => StatusCode::BAD_GATEWAY,
        RenderError | DatabaseError | InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let DomainError {
            code,
            message,
            details,
        } = self.0;
        let status = status_for(code);
        let body = ErrorResponse {
            code: code.as_str().to_string(),
            message,
            details,
        };

        if status.is_server_error() {
            tracing::error!(code = %code, message = %body.message, "Request failed");
            let generic = ErrorResponse::new(code.as_str(), "An internal error occurred");
            let mut response = (status, Json(generic)).into_response();
            response.extensions_mut().insert(SuppressedDetail(body));
            return response;
        }

        (status, Json(body)).into_response()
    }
}

/// Response mapper installed when `verbose_errors` is on.
pub async fn expose_error_details(response: Response) -> Response {
    match response.extensions().get::<SuppressedDetail>().cloned() {
        Some(SuppressedDetail(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}
