use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::classify_types::ErrorBody;

pub const NO_IMAGE_MESSAGE: &str = "No image provided";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const MISSING_KEY_MESSAGE: &str =
    "API key not configured. Please add GEMINI_API_KEY to environment variables.";
pub const CLASSIFY_FAILED_MESSAGE: &str = "Failed to classify image. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request carried no image at all.
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImage,

    /// Rejected before the pipeline is contacted.
    #[error("{0}")]
    Input(String),

    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed,

    /// Missing or unusable credential. Not actionable by the end user.
    #[error("{0}")]
    Configuration(String),

    /// The oracle was unreachable or answered with a non-success status.
    #[error("upstream identification failed: {0}")]
    Upstream(String),

    /// Media acquisition failed; never reaches the pipeline.
    #[error("{0}")]
    Capture(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// The HTTP listener failed while serving.
    #[error("server error: {0}")]
    Server(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoImage | AppError::Input(_) | AppError::Capture(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration(_)
            | AppError::Upstream(_)
            | AppError::Storage(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire representation returned by the classify endpoint.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            AppError::NoImage => ErrorBody::new(NO_IMAGE_MESSAGE),
            AppError::Input(message) => {
                ErrorBody::new("Invalid image payload").with_details(message.clone())
            }
            AppError::MethodNotAllowed => ErrorBody::new(METHOD_NOT_ALLOWED_MESSAGE),
            AppError::Configuration(message) => ErrorBody::new(message.clone()),
            AppError::Upstream(detail)
            | AppError::Storage(detail)
            | AppError::Capture(detail)
            | AppError::Server(detail) => {
                ErrorBody::new(CLASSIFY_FAILED_MESSAGE).with_details(detail.clone())
            }
        }
    }

    /// Message shown to the person using the workflow.
    pub fn user_notice(&self) -> String {
        match self {
            AppError::NoImage => NO_IMAGE_MESSAGE.to_string(),
            AppError::Input(message) | AppError::Capture(message) => message.clone(),
            AppError::MethodNotAllowed => "The classification service rejected the request.".to_string(),
            AppError::Configuration(_) => {
                "The classification service is not configured yet. Please contact the operator."
                    .to_string()
            }
            AppError::Upstream(_) | AppError::Storage(_) | AppError::Server(_) => {
                CLASSIFY_FAILED_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Input(format!("Unreadable image: {}", err))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::Input(format!("Image is not valid base64: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        AppError::Upstream(err.without_url().to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_has_its_own_body() {
        let body = serde_json::to_value(AppError::NoImage.to_body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": NO_IMAGE_MESSAGE }));
        assert_eq!(AppError::NoImage.status_code(), StatusCode::BAD_REQUEST);

        // An input error that happens to read the same is still an invalid payload.
        let lookalike = AppError::Input(NO_IMAGE_MESSAGE.to_string()).to_body();
        assert_eq!(lookalike.error, "Invalid image payload");
        assert_eq!(lookalike.details.as_deref(), Some(NO_IMAGE_MESSAGE));
    }

    #[test]
    fn server_failures_are_not_reported_as_upstream() {
        let err = AppError::Server("connection reset".into());
        assert_eq!(err.to_string(), "server error: connection reset");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
