use crate::error::AppError;
use crate::models::classify_types::{ClassifyRequest, ClassifyResponse};
use crate::services::classifier::identifier::Identifier;
use crate::services::classifier::{demo, rules};
use crate::services::image_payload;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassificationMode {
    /// Oracle identification followed by the keyword rules.
    Rules,
    /// Random, flagged output. Never contacts the oracle.
    Demo,
}

/// Identification followed by rule-based categorization.
#[derive(Clone)]
pub struct ClassificationPipeline {
    identifier: Arc<dyn Identifier>,
    mode: ClassificationMode,
}

impl ClassificationPipeline {
    pub fn new(identifier: Arc<dyn Identifier>) -> Self {
        Self {
            identifier,
            mode: ClassificationMode::Rules,
        }
    }

    pub fn with_mode(mut self, mode: ClassificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    pub async fn classify_request(&self, request: &ClassifyRequest) -> Result<ClassifyResponse, AppError> {
        let raw = request
            .image
            .as_deref()
            .filter(|image| !image.trim().is_empty())
            .ok_or(AppError::NoImage)?;

        let payload = image_payload::decode(raw)?;

        if self.mode == ClassificationMode::Demo {
            warn!("demo mode active, returning a simulated prediction");
            return Ok(demo::demo_response(&mut rand::thread_rng()));
        }

        let label = self.identifier.identify(&payload).await?;
        let classification = rules::classify(&label);
        info!(
            label = %label,
            category = %classification.category,
            uncertain = classification.uncertain,
            "classified item"
        );

        Ok(ClassifyResponse::from_classification(label, &classification))
    }
}
