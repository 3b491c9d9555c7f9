use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteCategory {
    Recyclable,
    Organic,
    Hazardous,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 3] = [
        WasteCategory::Recyclable,
        WasteCategory::Organic,
        WasteCategory::Hazardous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Recyclable => "Recyclable",
            WasteCategory::Organic => "Organic",
            WasteCategory::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the rule engine for a single label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: WasteCategory,
    pub awareness_message: &'static str,
    pub alternatives: &'static [&'static str],
    /// Set when no keyword matched and the category is a fallback.
    pub uncertain: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub image: Option<String>,
}

impl ClassifyRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub object_name: String,
    pub category: WasteCategory,
    pub awareness_message: String,
    pub alternatives: Vec<String>,
    /// Only present on degraded demo-mode output.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub demo: bool,
}

impl ClassifyResponse {
    pub fn from_classification(object_name: String, result: &ClassificationResult) -> Self {
        Self {
            object_name,
            category: result.category,
            awareness_message: result.awareness_message.to_string(),
            alternatives: result.alternatives.iter().map(|a| a.to_string()).collect(),
            demo: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
