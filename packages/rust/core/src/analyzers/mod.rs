//! Analyzers: pure mappings from a [`ScrapedPage`](toolscout_shared::ScrapedPage)
//! to pieces of a [`ToolAnalysis`](toolscout_shared::ToolAnalysis).
//!
//! - [`pricing`] and [`affiliate`] are deterministic keyword analyzers
//! - [`primary`] asks the AI service for the descriptive profile
//! - [`heuristic`] builds the same profile without AI and backs [`primary`] up

pub mod affiliate;
pub mod heuristic;
pub mod pricing;
pub mod primary;

use toolscout_shared::{AnalysisSource, PricingModel, PricingPlan};

pub use affiliate::analyze_affiliate;
pub use heuristic::{HEURISTIC_CONFIDENCE, heuristic_profile};
pub use pricing::analyze_pricing;
pub use primary::analyze_primary;

/// The descriptive part of a tool analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolProfile {
    pub tool_name: String,
    pub slug: String,
    pub primary_function: String,
    pub key_features: Vec<String>,
    pub target_audience: Vec<String>,
    pub category: String,
    pub description: String,
    pub meta_title: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub confidence: u8,
    pub data_completeness: u8,
    /// Pricing model as reported by the analyzer (informational).
    pub pricing_model: PricingModel,
    /// Plans reported by the analyzer, if any.
    pub plans: Vec<PricingPlan>,
}

/// Result of the primary analyzer: the AI profile, or the heuristic one and why.
#[derive(Debug, Clone)]
pub enum PrimaryOutcome {
    Ai { profile: ToolProfile, model: String },
    Fallback { profile: ToolProfile, reason: String },
}

impl PrimaryOutcome {
    /// Split into the profile and the [`AnalysisSource`] to record.
    pub fn into_parts(self) -> (ToolProfile, AnalysisSource) {
        match self {
            Self::Ai { profile, model } => (profile, AnalysisSource::Ai { model }),
            Self::Fallback { profile, reason } => (profile, AnalysisSource::Heuristic { reason }),
        }
    }
}
