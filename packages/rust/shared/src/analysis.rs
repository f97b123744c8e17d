//! Enrichment pipeline records: what the fetcher scrapes and what the
//! analyzers produce.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScrapedPage
// ---------------------------------------------------------------------------

/// Social platform name (`"github"`, `"twitter"`, ...) → absolute profile URL.
pub type SocialLinks = BTreeMap<String, String>;

/// Page-level metadata from `<meta>` tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub description: String,
    pub keywords: Vec<String>,
    pub og_title: String,
    pub og_description: String,
}

/// Contact channels found on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_form_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
}

impl ContactInfo {
    /// True when no channel was found.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.contact_form_url.is_none()
            && self.support_url.is_none()
    }
}

/// An anchor on the page, resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
    pub text: String,
}

/// Raw content and pre-extracted signals for one fetched website.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    /// HTTP status code of the final response.
    pub status_code: u16,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
    /// SHA-256 of the raw response body.
    pub content_hash: String,
    pub title: String,
    pub description: String,
    /// Visible text of the main content region, one text run per line.
    pub content: String,
    pub metadata: PageMetadata,
    pub social_links: SocialLinks,
    pub contact_info: ContactInfo,
    /// Short texts that look like prices or pricing mentions.
    pub pricing: Vec<String>,
    /// Texts that look like feature descriptions.
    pub features: Vec<String>,
    pub links: Vec<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Pricing model classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Free,
    Freemium,
    Paid,
    Subscription,
    UsageBased,
    Enterprise,
    Unknown,
}

impl PricingModel {
    /// Parse a free-form label such as `"Freemium"` or `"Pay as you go"`.
    /// Anything unrecognised maps to [`PricingModel::Unknown`].
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_lowercase();
        if l.contains("freemium") {
            Self::Freemium
        } else if l.contains("usage") || l.contains("pay as you go") || l.contains("credit") {
            Self::UsageBased
        } else if l.contains("subscription") {
            Self::Subscription
        } else if l.contains("enterprise") {
            Self::Enterprise
        } else if l.contains("paid") {
            Self::Paid
        } else if l.contains("free") {
            Self::Free
        } else {
            Self::Unknown
        }
    }

    /// Display label used in summaries and catalogue fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Freemium => "Freemium",
            Self::Paid => "Paid",
            Self::Subscription => "Subscription",
            Self::UsageBased => "Usage-based",
            Self::Enterprise => "Enterprise",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing cycle of a pricing plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    OneTime,
}

/// One pricing plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub billing: BillingCycle,
}

/// Pricing analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingDetails {
    pub model: PricingModel,
    pub plans: Vec<PricingPlan>,
    pub free_tier: bool,
    pub paid_plans: bool,
    pub enterprise_available: bool,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Affiliate
// ---------------------------------------------------------------------------

/// Affiliate program indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateInfo {
    pub has_affiliate_program: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_form: Option<String>,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// ToolAnalysis
// ---------------------------------------------------------------------------

/// Which analyzer produced the descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    /// The AI-backed primary analyzer, with the model that answered.
    Ai { model: String },
    /// The deterministic fallback, with the reason the primary path failed.
    Heuristic { reason: String },
}

impl AnalysisSource {
    pub fn is_ai(&self) -> bool {
        matches!(self, Self::Ai { .. })
    }

    /// Short label stored with analysis runs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ai { .. } => "ai",
            Self::Heuristic { .. } => "heuristic",
        }
    }
}

/// Localized copy of the descriptive fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// ISO 639-1 language code.
    pub language: String,
    pub tool_name: String,
    pub primary_function: String,
    pub key_features: Vec<String>,
    pub target_audience: Vec<String>,
    pub description: String,
    pub meta_title: String,
    pub meta_description: String,
    pub pricing_summary: String,
}

/// The merged result of one enrichment pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAnalysis {
    pub url: String,
    pub tool_name: String,
    pub slug: String,
    pub primary_function: String,
    pub key_features: Vec<String>,
    pub target_audience: Vec<String>,
    pub category: String,
    /// SEO description (HTML).
    pub description: String,
    pub meta_title: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub recommended_actions: Vec<String>,
    /// 0–100.
    pub confidence: u8,
    /// 0–100, as estimated by the analyzer.
    pub data_completeness: u8,
    /// 0–100, computed from which fields are filled.
    pub completeness_score: u8,
    pub source: AnalysisSource,
    pub pricing_details: PricingDetails,
    pub pricing_summary: String,
    pub affiliate_info: AffiliateInfo,
    pub social_links: SocialLinks,
    pub contact_info: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,
    /// Degradations that happened while producing this record.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// SHA-256 of the fetched page body.
    pub content_hash: String,
    pub analyzed_at: DateTime<Utc>,
}
