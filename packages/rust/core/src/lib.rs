//! Core enrichment logic for ToolScout.
//!
//! This crate ties together fetching, deterministic and AI-backed analysis,
//! translation, and catalogue updates into end-to-end workflows
//! (e.g., [`Enricher::enrich`], [`catalogue::analyze_tool`]).

pub mod ai;
pub mod analyzers;
pub mod catalogue;
pub mod content;
pub mod pipeline;
pub mod prompts;
pub mod translate;

#[cfg(test)]
pub(crate) mod testing;

pub use ai::{GeminiClient, GenerationProfile, Generated, TextGenerator};
pub use analyzers::{PrimaryOutcome, ToolProfile};
pub use catalogue::{AnalyzeRequest, ApiResponse, ToolField};
pub use pipeline::{
    EnrichOptions, Enricher, EnrichmentProgress, SilentEnrichmentProgress, completeness_score,
};
