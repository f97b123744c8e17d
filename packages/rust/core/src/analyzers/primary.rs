//! AI-backed primary analysis, falling back to the heuristic profile.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use toolscout_shared::{
    BillingCycle, PricingModel, PricingPlan, Result, ScrapedPage, ToolScoutError,
};

use super::heuristic::heuristic_profile;
use super::pricing::analyze_pricing;
use super::{PrimaryOutcome, ToolProfile};
use crate::ai::{GenerationProfile, TextGenerator, extract_json_object};
use crate::content::{
    META_DESCRIPTION_MAX, META_TITLE_MAX, fallback_meta_description, fallback_meta_title,
    seo_description, tool_slug,
};
use crate::prompts::analysis_prompt;

/// Descriptions shorter than this are replaced by the template.
const MIN_DESCRIPTION_CHARS: usize = 500;

const DEFAULT_CONFIDENCE: u8 = 75;
const DEFAULT_COMPLETENESS: u8 = 70;

/// The JSON object the model is asked for. Every field is optional so that
/// validation can report what is missing instead of a serde error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AnalysisReply {
    tool_name: Option<String>,
    primary_function: Option<String>,
    key_features: Vec<String>,
    target_audience: Vec<String>,
    pricing_model: Option<String>,
    category: Option<String>,
    description: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    tags: Vec<String>,
    confidence: Option<Value>,
    data_completeness: Option<Value>,
    recommended_actions: Vec<String>,
    pricing_details: Option<PricingReply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PricingReply {
    model: Option<String>,
    plans: Vec<PlanReply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlanReply {
    name: Option<String>,
    price: Option<String>,
    features: Vec<String>,
    billing: Option<String>,
}

/// Ask the model for a profile of `page`; on any failure, use the heuristic one.
#[instrument(skip_all, fields(url = %page.final_url))]
pub async fn analyze_primary<G: TextGenerator>(
    generator: &G,
    page: &ScrapedPage,
    site_name: &str,
    char_limit: usize,
) -> PrimaryOutcome {
    match ai_profile(generator, page, site_name, char_limit).await {
        Ok((profile, model)) => {
            info!(%model, tool = %profile.tool_name, "AI analysis succeeded");
            PrimaryOutcome::Ai { profile, model }
        }
        Err(e) => {
            let reason = e.to_string();
            warn!(error = %reason, "AI analysis failed, using heuristic profile");
            PrimaryOutcome::Fallback {
                profile: heuristic_profile(page, site_name),
                reason,
            }
        }
    }
}

async fn ai_profile<G: TextGenerator>(
    generator: &G,
    page: &ScrapedPage,
    site_name: &str,
    char_limit: usize,
) -> Result<(ToolProfile, String)> {
    let prompt = analysis_prompt(page, site_name, char_limit);
    let reply = generator
        .generate(&prompt, GenerationProfile::Analysis)
        .await?;

    let json = extract_json_object(&reply.text)
        .ok_or_else(|| ToolScoutError::parse("no JSON object in AI reply"))?;
    let parsed: AnalysisReply = serde_json::from_str(&json)
        .map_err(|e| ToolScoutError::parse(format!("invalid AI reply: {e}")))?;

    let profile = build_profile(parsed, page, site_name)?;
    Ok((profile, reply.model))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolScoutError::parse(format!("AI reply is missing {field}")))
}

fn build_profile(reply: AnalysisReply, page: &ScrapedPage, site_name: &str) -> Result<ToolProfile> {
    let tool_name = required(reply.tool_name, "toolName")?;
    let primary_function = required(reply.primary_function, "primaryFunction")?;
    let category = required(reply.category, "category")?;

    let pricing_model = reply
        .pricing_details
        .as_ref()
        .and_then(|p| p.model.as_deref())
        .or(reply.pricing_model.as_deref())
        .map(PricingModel::from_label)
        .filter(|m| *m != PricingModel::Unknown)
        .unwrap_or_else(|| analyze_pricing(page).model);

    let meta_title = reply
        .meta_title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t.chars().count() <= META_TITLE_MAX)
        .unwrap_or_else(|| fallback_meta_title(&tool_name, &category, site_name));
    let meta_description = reply
        .meta_description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty() && d.chars().count() <= META_DESCRIPTION_MAX)
        .unwrap_or_else(|| fallback_meta_description(&tool_name, &category));
    let description = reply
        .description
        .filter(|d| d.chars().count() >= MIN_DESCRIPTION_CHARS)
        .unwrap_or_else(|| {
            seo_description(&tool_name, &category, &reply.key_features, pricing_model)
        });

    let plans = reply
        .pricing_details
        .map(|p| p.plans.into_iter().filter_map(PlanReply::into_plan).collect())
        .unwrap_or_default();

    Ok(ToolProfile {
        slug: tool_slug(&tool_name, page),
        key_features: reply.key_features,
        target_audience: reply.target_audience,
        description,
        meta_title,
        meta_description,
        tags: reply.tags,
        recommended_actions: reply.recommended_actions,
        confidence: score(reply.confidence.as_ref(), 60, DEFAULT_CONFIDENCE),
        data_completeness: score(reply.data_completeness.as_ref(), 50, DEFAULT_COMPLETENESS),
        pricing_model,
        plans,
        tool_name,
        primary_function,
        category,
    })
}

/// Read a 0–100 score given as a number or numeric string; zero or missing
/// yields `default`, anything else is clamped to `min..=100`.
fn score(value: Option<&Value>, min: u8, default: u8) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v.round().clamp(f64::from(min), 100.0) as u8,
        _ => default,
    }
}

impl PlanReply {
    fn into_plan(self) -> Option<PricingPlan> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        let billing = match self.billing.as_deref().map(str::to_lowercase).as_deref() {
            Some(b) if b.contains("month") => BillingCycle::Monthly,
            Some(b) if b.contains("year") || b.contains("annual") => BillingCycle::Yearly,
            _ => BillingCycle::OneTime,
        };
        Some(PricingPlan {
            name,
            price: self.price.unwrap_or_default(),
            features: self.features,
            billing,
        })
    }
}
