//! Prompt builders for the analysis and translation calls.

use toolscout_shared::{ScrapedPage, ToolAnalysis};

use crate::content::{META_DESCRIPTION_MAX, META_TITLE_MAX, truncate_chars};

/// Categories offered to the model.
pub const CATEGORY_TAXONOMY: &[&str] = &[
    "AI Assistant",
    "Content Creation",
    "Image Generation",
    "Video Generation",
    "Audio Generation",
    "Data Analysis",
    "Developer Tools",
    "Marketing",
    "Design",
    "Productivity",
    "Education",
    "Customer Support",
    "Sales",
    "SEO",
    "Social Media",
    "Translation",
    "Voice/Speech",
    "Music",
    "Writing",
    "Research",
    "Automation",
    "No-code",
    "3D Generation",
    "Avatar Generation",
    "Chatbot Builder",
];

/// Prompt asking for the structured tool profile as one JSON object.
pub fn analysis_prompt(page: &ScrapedPage, site_name: &str, char_limit: usize) -> String {
    let metadata = serde_json::to_string(&page.metadata).unwrap_or_default();
    let content = truncate_chars(&page.content, char_limit);
    let categories = CATEGORY_TAXONOMY.join(", ");

    format!(
        r#"You are an analyst writing catalogue entries for {site_name}, a directory of AI tools.
Analyze the website below and describe the tool it presents.

Website: {url}
Title: {title}
Content: {content}
Metadata: {metadata}
Pricing mentions: {pricing}
Feature mentions: {features}

Reply with a single valid JSON object and nothing else, using this structure:

{{
  "toolName": "Official name of the tool",
  "primaryFunction": "One sentence on what the tool does",
  "keyFeatures": ["feature 1", "feature 2", "feature 3", "feature 4", "feature 5"],
  "targetAudience": ["audience 1", "audience 2", "audience 3"],
  "pricingModel": "Free/Freemium/Paid/Subscription/Usage-based/Enterprise",
  "category": "One of: {categories}",
  "description": "SEO description of at least 500 words in HTML with <h2>/<h3> sections and <strong> for key benefits",
  "metaTitle": "At most {META_TITLE_MAX} characters, ending with \" - {site_name}\"",
  "metaDescription": "At most {META_DESCRIPTION_MAX} characters with a call to action",
  "tags": ["tag1", "tag2", "tag3", "tag4", "tag5"],
  "confidence": 85,
  "dataCompleteness": 90,
  "recommendedActions": ["action 1", "action 2"],
  "pricingDetails": {{
    "model": "Free/Freemium/Paid/Subscription/Usage-based/Enterprise",
    "plans": [{{ "name": "Plan name", "price": "$10/month", "features": ["..."], "billing": "monthly/yearly/one-time" }}]
  }}
}}

Use the tool's real name from the website. Keep confidence and dataCompleteness between 0 and 100 and
lower them when the page gives little information."#,
        url = page.final_url,
        title = page.title,
        pricing = page.pricing.join(", "),
        features = page.features.join(", "),
    )
}

/// Human-readable name for an ISO 639-1 code, falling back to the code itself.
pub fn language_name(code: &str) -> &str {
    match code {
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "pl" => "Polish",
        "sv" => "Swedish",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "en" => "English",
        other => other,
    }
}

/// Prompt asking for a translated copy of the descriptive fields.
pub fn translation_prompt(analysis: &ToolAnalysis, language: &str, site_name: &str) -> String {
    let language = language_name(language);

    format!(
        r#"Translate the following AI tool listing into {language}. Keep the HTML structure of the
description, keep brand and product names untranslated, and adapt marketing phrasing to
{language}-speaking readers.

Tool Name: {name}
Primary Function: {function}
Key Features: {features}
Target Audience: {audience}
Description: {description}
Meta Title: {meta_title}
Meta Description: {meta_description}
Pricing Summary: {pricing_summary}

Reply with a single valid JSON object and nothing else:

{{
  "toolName": "Tool name",
  "primaryFunction": "Translated primary function",
  "keyFeatures": ["Translated feature 1", "Translated feature 2"],
  "targetAudience": ["Translated audience 1", "Translated audience 2"],
  "description": "Translated HTML description",
  "metaTitle": "Translated meta title ending with \" - {site_name}\"",
  "metaDescription": "Translated meta description",
  "pricingSummary": "Translated pricing summary"
}}"#,
        name = analysis.tool_name,
        function = analysis.primary_function,
        features = analysis.key_features.join(", "),
        audience = analysis.target_audience.join(", "),
        description = analysis.description,
        meta_title = analysis.meta_title,
        meta_description = analysis.meta_description,
        pricing_summary = analysis.pricing_summary,
    )
}
