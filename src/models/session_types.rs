use crate::models::classify_types::ClassifyResponse;
use serde::Serialize;

/// An acquired image in data-URI form, as produced by file upload or camera capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self(data_uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    Previewing,
    Classifying,
    Result,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current_image: Option<EncodedImage>,
    pub items_sorted: u64,
}

impl SessionState {
    pub fn new(items_sorted: u64) -> Self {
        Self {
            current_image: None,
            items_sorted,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedResult {
    #[serde(flatten)]
    pub response: ClassifyResponse,
    pub fun_fact: &'static str,
}
