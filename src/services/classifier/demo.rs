//! Degraded demo mode: a random category for exercising the UI without an oracle.
//! Output is always flagged with `demo: true` and a "DEMO" object name.

use crate::models::classify_types::{ClassifyResponse, WasteCategory};
use crate::services::classifier::rules;
use rand::seq::SliceRandom;
use rand::Rng;

const DEMO_NOTICE: &str =
    "DEMO MODE ACTIVE: Using random prediction. Configure GEMINI_API_KEY and disable demo mode for real results.";

pub fn demo_response<R: Rng + ?Sized>(rng: &mut R) -> ClassifyResponse {
    let category = *WasteCategory::ALL
        .choose(rng)
        .unwrap_or(&WasteCategory::Recyclable);
    let guidance = rules::guidance_for(category);

    ClassifyResponse {
        object_name: format!("DEMO: {} (Simulated)", category),
        category,
        awareness_message: format!("{}\n\n{}", DEMO_NOTICE, guidance.awareness_message),
        alternatives: guidance.alternatives.iter().map(|a| a.to_string()).collect(),
        demo: true,
    }
}
