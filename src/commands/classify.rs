use crate::error::AppError;
use crate::models::classify_types::ClassifyRequest;
use crate::server::{AppState, MAX_BODY_BYTES};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};

/// `/api/classify`. Accepts any verb so 405 and bare OPTIONS get the wire error shape.
pub async fn classify_image(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::POST {
        return AppError::MethodNotAllowed.into_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection).into_response(),
    };

    // An unparseable body is treated the same as one without an image.
    let request: ClassifyRequest = serde_json::from_slice(&body).unwrap_or_default();

    match state.pipeline.classify_request(&request).await {
        Ok(response) => {
            info!(category = %response.category, "classify request served");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(error = %err, "classify request failed");
            }
            err.into_response()
        }
    }
}

fn body_rejected(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("classify request body over the size limit");
        return AppError::Input(format!(
            "Image is too large; the upload limit is {} MB",
            MAX_BODY_BYTES / (1024 * 1024)
        ));
    }
    AppError::Input(rejection.body_text())
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
