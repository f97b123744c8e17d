//! Deterministic tool profile used when the AI path is unavailable.

use toolscout_shared::ScrapedPage;

use super::ToolProfile;
use super::pricing::analyze_pricing;
use crate::content::{
    fallback_meta_description, fallback_meta_title, host_label, seo_description, tool_slug,
    truncate_chars,
};

/// Confidence and data completeness reported for heuristic profiles.
pub const HEURISTIC_CONFIDENCE: u8 = 60;

const DEFAULT_CATEGORY: &str = "AI Assistant";
const UNKNOWN_TOOL: &str = "Unknown Tool";
const MAX_FEATURES: usize = 5;
const MAX_FEATURE_CHARS: usize = 100;

const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " – ", ": "];

/// First match wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Image Generation",
        &[
            "image generat",
            "ai art",
            "create image",
            "photo generat",
            "text-to-image",
            "dall-e",
            "midjourney",
            "stable diffusion",
        ],
    ),
    (
        "Video Generation",
        &[
            "video generat",
            "create video",
            "ai video",
            "video creation",
            "video edit",
            "text-to-video",
        ],
    ),
    (
        "Audio Generation",
        &[
            "audio generat",
            "text-to-speech",
            "voice generat",
            "music generat",
            "ai voice",
            "podcast",
        ],
    ),
    (
        "Content Creation",
        &[
            "content creat",
            "blog writ",
            "copywriting",
            "article writ",
            "content generat",
        ],
    ),
    (
        "Developer Tools",
        &["developer", "coding", "programming", "code generat", " api"],
    ),
    (
        "Data Analysis",
        &[
            "data analys",
            "analytics",
            "business intelligence",
            "data visual",
            "reporting",
        ],
    ),
    (
        "AI Assistant",
        &[
            "ai assistant",
            "chatbot",
            "virtual assistant",
            "conversational ai",
            "chat gpt",
        ],
    ),
];

/// Build a profile from page signals alone.
pub fn heuristic_profile(page: &ScrapedPage, site_name: &str) -> ToolProfile {
    let tool_name = tool_name(page);
    let category = category(page).to_string();
    let key_features: Vec<String> = page
        .features
        .iter()
        .take(MAX_FEATURES)
        .map(|f| truncate_chars(f, MAX_FEATURE_CHARS).to_string())
        .collect();
    let pricing_model = analyze_pricing(page).model;

    ToolProfile {
        slug: tool_slug(&tool_name, page),
        primary_function: format!("AI-powered {}", category.to_lowercase()),
        target_audience: vec![
            "Content creators".into(),
            "Professionals".into(),
            "Businesses".into(),
        ],
        description: seo_description(&tool_name, &category, &key_features, pricing_model),
        meta_title: fallback_meta_title(&tool_name, &category, site_name),
        meta_description: fallback_meta_description(&tool_name, &category),
        tags: vec![
            "AI".into(),
            category.replace(' ', ""),
            "Automation".into(),
            "Productivity".into(),
        ],
        recommended_actions: vec![
            "Verify tool name and features".into(),
            "Check pricing details".into(),
            "Confirm target audience".into(),
        ],
        confidence: HEURISTIC_CONFIDENCE,
        data_completeness: HEURISTIC_CONFIDENCE,
        pricing_model,
        plans: Vec::new(),
        key_features,
        category,
        tool_name,
    }
}

fn tool_name(page: &ScrapedPage) -> String {
    let title = page.title.trim();
    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    let name = title[..cut].trim();
    if !name.is_empty() {
        return name.to_string();
    }

    host_label(&page.final_url)
        .or_else(|| host_label(&page.url))
        .unwrap_or_else(|| UNKNOWN_TOOL.to_string())
}

fn category(page: &ScrapedPage) -> &'static str {
    let haystack = format!("{}\n{}", page.title, page.content).to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map_or(DEFAULT_CATEGORY, |(category, _)| *category)
}
