//! Catalogue domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for catalogue listings.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound on catalogue page size.
pub const MAX_PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// Tool
// ---------------------------------------------------------------------------

/// A catalogue entry representing one external AI product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// The tool's website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated audiences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    /// Comma-separated features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_features: Option<String>,
    /// Comma-separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    pub is_active: bool,
    pub featured: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_optimized_at: Option<DateTime<Utc>>,
}

/// Fields for creating a catalogue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTool {
    pub slug: String,
    pub name: String,
    pub link: Option<String>,
    pub category: Option<String>,
    pub overview: Option<String>,
    pub description: Option<String>,
    pub target_audience: Option<String>,
    pub key_features: Option<String>,
    pub tags: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub quality_score: Option<f64>,
    pub featured: bool,
}

/// Partial update of a catalogue entry. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolUpdate {
    pub name: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub overview: Option<String>,
    pub description: Option<String>,
    pub target_audience: Option<String>,
    pub key_features: Option<String>,
    pub tags: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub quality_score: Option<f64>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_optimized_at: Option<DateTime<Utc>>,
}

impl ToolUpdate {
    /// True when applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Filters and pagination for catalogue listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub category: Option<String>,
    /// Only active tools (default).
    pub active_only: bool,
    pub featured_only: bool,
}

impl Default for ToolQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            category: None,
            active_only: true,
            featured_only: false,
        }
    }
}

impl ToolQuery {
    /// Clamp page/per_page and return the SQL `(limit, offset)` window.
    pub fn window(&self) -> (u32, u32) {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.max(1);
        (per_page, (page - 1).saturating_mul(per_page))
    }
}

/// One page of catalogue results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPage {
    pub items: Vec<Tool>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page)) as u32
}
