use crate::models::classify_types::{ClassificationResult, WasteCategory};

const HAZARDOUS_KEYWORDS: &[&str] = &[
    "battery", "electronic", "phone", "computer", "charger", "cable", "chemical", "paint", "oil",
    "medicine", "pill", "syringe", "needle", "bleach", "cleaner", "pesticide", "bulb",
    "fluorescent", "thermometer",
];

const ORGANIC_KEYWORDS: &[&str] = &[
    "peel", "banana", "apple", "orange", "fruit", "vegetable", "food", "waste", "scrap", "compost",
    "leaves", "grass", "plant", "flower", "coffee", "grounds", "tea", "eggshell", "bread", "rice",
    "leftover",
];

const RECYCLABLE_KEYWORDS: &[&str] = &[
    "bottle", "plastic", "can", "aluminum", "glass", "jar", "container", "paper", "cardboard",
    "box", "newspaper", "magazine", "carton", "metal", "tin", "steel", "cup", "bag", "wrapper",
    "packaging",
];

/// Evaluated top to bottom; the first set with a matching keyword wins.
/// Hazardous sits first so ambiguous items take the stricter disposal path.
pub const RULES: [(WasteCategory, &[&str]); 3] = [
    (WasteCategory::Hazardous, HAZARDOUS_KEYWORDS),
    (WasteCategory::Organic, ORGANIC_KEYWORDS),
    (WasteCategory::Recyclable, RECYCLABLE_KEYWORDS),
];

const HAZARDOUS_MESSAGE: &str = "This item contains materials that can harm the environment and human health if not disposed of properly. Please take it to a designated hazardous waste collection facility. Don't throw it in regular trash or recycling bins!";

const HAZARDOUS_ALTERNATIVES: &[&str] = &[
    "Find your nearest e-waste or hazardous waste collection center",
    "Check if the manufacturer has a take-back program",
    "Contact your local municipality for safe disposal options",
    "Never pour chemicals down drains or throw batteries in regular trash",
];

const ORGANIC_MESSAGE: &str = "This is biodegradable organic waste! Instead of sending it to a landfill where it produces harmful methane gas, you can compost it. Composting turns food scraps into nutrient-rich soil that helps plants grow.";

const ORGANIC_ALTERNATIVES: &[&str] = &[
    "Start a home compost bin (it's easier than you think!)",
    "Use a community composting service if available",
    "Feed appropriate scraps to chickens or farm animals",
    "Create a small vermicompost (worm composting) setup for apartments",
];

const RECYCLABLE_MESSAGE: &str = "Great news! This item can be recycled and turned into new products. Make sure to rinse it clean and check your local recycling guidelines. Recycling saves energy, reduces pollution, and conserves natural resources.";

const RECYCLABLE_ALTERNATIVES: &[&str] = &[
    "Rinse containers before recycling to avoid contamination",
    "Remove caps and labels if your facility requires it",
    "Consider reusing this item before recycling (reduce comes first!)",
    "Flatten cardboard boxes to save space in recycling bins",
];

pub const UNCERTAIN_MESSAGE: &str = "I'm not entirely sure about this item, but it might be recyclable. To be safe, check with your local waste management guidelines. When in doubt, it's better to ask than to contaminate recycling streams.";

const UNCERTAIN_ALTERNATIVES: &[&str] = &[
    "Contact your local waste management authority for guidance",
    "Check online recycling databases for your area",
    "Look for recycling symbols on the packaging",
    "Consider if this item can be reused or repurposed first",
];

/// Standard guidance for a confirmed match on `category`.
pub fn guidance_for(category: WasteCategory) -> ClassificationResult {
    let (awareness_message, alternatives) = match category {
        WasteCategory::Hazardous => (HAZARDOUS_MESSAGE, HAZARDOUS_ALTERNATIVES),
        WasteCategory::Organic => (ORGANIC_MESSAGE, ORGANIC_ALTERNATIVES),
        WasteCategory::Recyclable => (RECYCLABLE_MESSAGE, RECYCLABLE_ALTERNATIVES),
    };
    ClassificationResult {
        category,
        awareness_message,
        alternatives,
        uncertain: false,
    }
}

fn uncertain_default() -> ClassificationResult {
    ClassificationResult {
        category: WasteCategory::Recyclable,
        awareness_message: UNCERTAIN_MESSAGE,
        alternatives: UNCERTAIN_ALTERNATIVES,
        uncertain: true,
    }
}

pub fn match_category(label: &str) -> Option<WasteCategory> {
    let lower = label.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
}

pub fn classify(label: &str) -> ClassificationResult {
    match match_category(label) {
        Some(category) => guidance_for(category),
        None => uncertain_default(),
    }
}
