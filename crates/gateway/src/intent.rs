//! Cheap text heuristics applied before any provider call.

/// Phrasings (English and French) that get the attribution reply instead of
/// a model answer.
pub const CREATOR_PHRASES: &[&str] = &[
    "who created you",
    "who made you",
    "who developed you",
    "who designed you",
    "who programmed you",
    "who built you",
    "qui t'as créé",
    "qui t'a créé",
    "qui t'as fait",
    "qui t'a fait",
    "qui t'as développé",
    "qui t'a développé",
    "qui t'as programmé",
    "qui t'a programmé",
    "qui t'as conçu",
    "qui t'a conçu",
    "qui t'as construit",
    "qui t'a construit",
    "your creator",
    "your developer",
    "your maker",
    "your designer",
    "your programmer",
    "your builder",
];

const IMAGE_NOUNS: &[&str] = &["image", "picture", "photo"];

pub fn is_creator_question(message: &str) -> bool {
    let lower = message.to_lowercase();
    CREATOR_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// "generate" plus an image noun anywhere in the text.
pub fn is_image_generation_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("generate") && IMAGE_NOUNS.iter().any(|noun| lower.contains(noun))
}
