use crate::commands;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::classifier::identifier::GeminiIdentifier;
use crate::services::pipeline::{ClassificationMode, ClassificationPipeline};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, Method};
use axum::routing::{any, get};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest `/api/classify` body accepted. Matches the vision service's inline-data cap.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClassificationPipeline>,
}

pub fn build_pipeline(config: &AppConfig) -> Result<ClassificationPipeline, AppError> {
    let identifier = GeminiIdentifier::new(
        config.api_key.clone(),
        config.api_base.clone(),
        config.model.clone(),
        config.timeout,
    )?;
    let mode = if config.demo_mode {
        ClassificationMode::Demo
    } else {
        ClassificationMode::Rules
    };
    Ok(ClassificationPipeline::new(Arc::new(identifier)).with_mode(mode))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
        ])
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/classify", any(commands::classify::classify_image))
        .route("/health", get(commands::classify::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> Result<(), AppError> {
    if config.api_key.is_none() && !config.demo_mode {
        warn!("GEMINI_API_KEY is not set; classify requests will fail until it is configured");
    }

    let pipeline = build_pipeline(&config)?;
    if pipeline.mode() == ClassificationMode::Demo {
        warn!("running in DEMO mode: predictions are random");
    }
    let app = router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| AppError::Configuration(format!("Failed to bind {}: {}", config.bind, e)))?;
    info!(addr = %config.bind, "waste sorter listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(format!("stopped: {}", e)))?;

    Ok(())
}
