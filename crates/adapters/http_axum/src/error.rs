//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use plughub_domain::error::PlugHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PlugHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(PlugHubError);

impl From<PlugHubError> for ApiError {
    fn from(err: PlugHubError) -> Self {
        Self(err)
    }
}

impl From<plughub_domain::error::UnknownDeviceError> for ApiError {
    fn from(err: plughub_domain::error::UnknownDeviceError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PlugHubError::Config(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PlugHubError::UnknownDevice(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PlugHubError::UnknownOutlet(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PlugHubError::Actuator(err) => {
                tracing::warn!(error = %err, "actuator error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            PlugHubError::Tracker(err) => {
                tracing::error!(error = %err, "tracker error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            PlugHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
