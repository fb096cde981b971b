pub mod admin;
pub mod auth;
pub mod events;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;
use weekcal_core::{ApiError, AuthError, Error, ValidationError};

/// Body sent to relay clients on a 401 from the calendar API.
pub const UNAUTHORIZED_BODY: &str = "Refresh OAuth Secret";

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!("Request failed with {}: {:#}", self.status, self.error);

        if self.status == StatusCode::UNAUTHORIZED {
            return (self.status, UNAUTHORIZED_BODY).into_response();
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        AppError {
            status: status_for(&error),
            error,
        }
    }
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    let api = error.downcast_ref::<ApiError>().or_else(|| match error.downcast_ref::<Error>() {
        Some(Error::Api(e)) => Some(e),
        _ => None,
    });

    match api {
        Some(ApiError::Unauthorized) => return StatusCode::UNAUTHORIZED,
        Some(ApiError::InvalidWindow(_) | ApiError::MissingEventId) => {
            return StatusCode::BAD_REQUEST;
        }
        Some(_) => return StatusCode::BAD_GATEWAY,
        None => {}
    }

    let umbrella = error.downcast_ref::<Error>();
    if error.is::<ValidationError>() || matches!(umbrella, Some(Error::Validation(_))) {
        StatusCode::BAD_REQUEST
    } else if error.is::<AuthError>() || matches!(umbrella, Some(Error::Auth(_))) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
