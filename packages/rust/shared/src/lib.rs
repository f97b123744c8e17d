//! Shared types, error model, and configuration for ToolScout.
//!
//! This crate is the foundation depended on by all other ToolScout crates.
//! It provides:
//! - [`ToolScoutError`]: the unified error type
//! - Pipeline records ([`ScrapedPage`], [`ToolAnalysis`], [`PricingDetails`], ...)
//! - Catalogue types ([`Tool`], [`NewTool`], [`ToolUpdate`], [`ToolQuery`])
//! - Configuration ([`AppConfig`], config loading)

pub mod analysis;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use analysis::{
    AffiliateInfo, AnalysisSource, BillingCycle, ContactInfo, PageLink, PageMetadata,
    PricingDetails, PricingModel, PricingPlan, ScrapedPage, SocialLinks, ToolAnalysis,
    Translation,
};
pub use config::{
    AiConfig, AppConfig, CatalogueConfig, FetchConfig, TranslationConfig, config_dir,
    config_file_path, database_path, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{Result, ToolScoutError};
pub use types::{
    DEFAULT_PER_PAGE, MAX_PER_PAGE, NewTool, Tool, ToolPage, ToolQuery, ToolUpdate, total_pages,
};
