use crate::error::{AppError, METHOD_NOT_ALLOWED_MESSAGE, MISSING_KEY_MESSAGE, NO_IMAGE_MESSAGE};
use crate::models::classify_types::{ClassifyRequest, ClassifyResponse, ErrorBody};
use crate::services::pipeline::ClassificationPipeline;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// The single request/response pair between the workflow and the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, request: &ClassifyRequest) -> Result<ClassifyResponse, AppError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit(&self, request: &ClassifyRequest) -> Result<ClassifyResponse, AppError> {
        (**self).submit(request).await
    }
}

/// Runs the pipeline in-process.
#[derive(Clone)]
pub struct LocalTransport {
    pipeline: ClassificationPipeline,
}

impl LocalTransport {
    pub fn new(pipeline: ClassificationPipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn submit(&self, request: &ClassifyRequest) -> Result<ClassifyResponse, AppError> {
        self.pipeline.classify_request(request).await
    }
}

/// Posts to a running `/api/classify` endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/classify", base_url.trim_end_matches('/')),
        })
    }
}

/// Map an error response back onto the error taxonomy.
pub fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.error.clone())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let details = parsed.and_then(|b| b.details);

    match status {
        StatusCode::METHOD_NOT_ALLOWED if message == METHOD_NOT_ALLOWED_MESSAGE => AppError::MethodNotAllowed,
        StatusCode::BAD_REQUEST if message == NO_IMAGE_MESSAGE && details.is_none() => AppError::NoImage,
        s if s.is_client_error() => match details {
            Some(details) => AppError::Input(details),
            None => AppError::Input(message),
        },
        _ if message == MISSING_KEY_MESSAGE => AppError::Configuration(message),
        _ => AppError::Upstream(details.unwrap_or(message)),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, request: &ClassifyRequest) -> Result<ClassifyResponse, AppError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if status == StatusCode::OK {
            return Ok(response.json::<ClassifyResponse>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}
