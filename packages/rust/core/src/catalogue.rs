//! Catalogue request handlers.
//!
//! Each handler runs the enrichment pipeline and/or touches storage, then
//! wraps the outcome in an [`ApiResponse`] envelope with an HTTP-style status.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use toolscout_fetcher::{PageFetcher, validate_url};
use toolscout_shared::{NewTool, Tool, ToolAnalysis, ToolScoutError, ToolUpdate};
use toolscout_storage::Storage;

use crate::ai::TextGenerator;
use crate::pipeline::{Enricher, EnrichmentProgress};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// `{ success, data | error, message }` plus the status code to send.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn ok(status: u16, data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
            status,
        }
    }

    pub fn failure(status: u16, error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message,
            status,
        }
    }

    /// Failure whose status follows the error kind.
    pub fn from_error(error: &ToolScoutError, context: &str) -> Self {
        Self::failure(status_for(error), context, Some(error.to_string()))
    }
}

/// Validation → 400, not found → 404, everything else → 500.
pub fn status_for(error: &ToolScoutError) -> u16 {
    match error {
        ToolScoutError::Validation { .. } => 400,
        ToolScoutError::NotFound { .. } => 404,
        _ => 500,
    }
}

// ---------------------------------------------------------------------------
// Catalogue fields
// ---------------------------------------------------------------------------

/// Catalogue columns that an analysis can refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolField {
    ToolName,
    ToolCategory,
    Overview,
    ToolDescription,
    TargetAudience,
    KeyFeatures,
    Tags,
    MetaTitle,
    MetaDescription,
    SeoKeywords,
}

impl ToolField {
    pub const ALL: [ToolField; 10] = [
        Self::ToolName,
        Self::ToolCategory,
        Self::Overview,
        Self::ToolDescription,
        Self::TargetAudience,
        Self::KeyFeatures,
        Self::Tags,
        Self::MetaTitle,
        Self::MetaDescription,
        Self::SeoKeywords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolName => "tool_name",
            Self::ToolCategory => "tool_category",
            Self::Overview => "overview",
            Self::ToolDescription => "tool_description",
            Self::TargetAudience => "target_audience",
            Self::KeyFeatures => "key_features",
            Self::Tags => "tags",
            Self::MetaTitle => "meta_title",
            Self::MetaDescription => "meta_description",
            Self::SeoKeywords => "seo_keywords",
        }
    }
}

impl fmt::Display for ToolField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolField {
    type Err = ToolScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ToolScoutError::validation(format!("unknown tool field '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Requests / payloads
// ---------------------------------------------------------------------------

/// Options for re-analyzing a catalogue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Fields to refresh; `None` or empty means all of them.
    #[serde(default)]
    pub fields: Option<Vec<ToolField>>,
    /// Also stamp `last_optimized_at`.
    #[serde(default)]
    pub mark_optimized: bool,
}

/// Payload of a successful [`analyze_tool`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeToolData {
    pub tool: Tool,
    pub analysis: ToolAnalysis,
    pub updated_fields: Vec<ToolField>,
    pub has_changes: bool,
    pub run_id: String,
}

/// Payload of a successful [`import_tool`].
#[derive(Debug, Clone, Serialize)]
pub struct ImportToolData {
    pub tool: Tool,
    pub analysis: ToolAnalysis,
    pub run_id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Analyze an arbitrary URL without touching the catalogue.
#[instrument(skip_all, fields(url = %raw_url))]
pub async fn scrape_url<F: PageFetcher, G: TextGenerator>(
    enricher: &Enricher<F, G>,
    raw_url: &str,
    progress: &dyn EnrichmentProgress,
) -> ApiResponse<ToolAnalysis> {
    let url = match validate_url(raw_url) {
        Ok(url) => url,
        Err(e) => return ApiResponse::failure(400, e.to_string(), None),
    };

    match enricher.enrich(&url, progress).await {
        Ok(analysis) => ApiResponse::ok(200, analysis, None),
        Err(e) => {
            warn!(error = %e, "scrape failed");
            ApiResponse::failure(
                500,
                "Failed to analyze the provided URL",
                Some(e.to_string()),
            )
        }
    }
}

/// Re-analyze a catalogue entry and write back the requested fields that changed.
#[instrument(skip_all, fields(tool_id = id))]
pub async fn analyze_tool<F: PageFetcher, G: TextGenerator>(
    storage: &Storage,
    enricher: &Enricher<F, G>,
    id: i64,
    request: &AnalyzeRequest,
    progress: &dyn EnrichmentProgress,
) -> ApiResponse<AnalyzeToolData> {
    let tool = match storage.get_tool_by_id(id).await {
        Ok(Some(tool)) => tool,
        Ok(None) => return ApiResponse::failure(404, "Tool not found", None),
        Err(e) => return ApiResponse::from_error(&e, "Failed to load tool"),
    };

    let Some(url) = tool.link.as_deref().and_then(|l| validate_url(l).ok()) else {
        return ApiResponse::failure(400, "Tool does not have a valid URL for analysis", None);
    };

    let analysis = match enricher.enrich(&url, progress).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "tool analysis failed");
            return ApiResponse::failure(500, "Failed to analyze tool", Some(e.to_string()));
        }
    };

    let all = ToolField::ALL;
    let fields = match request.fields.as_deref() {
        Some(fields) if !fields.is_empty() => fields,
        _ => &all[..],
    };
    let (mut update, updated_fields) = plan_update(&tool, &analysis, fields);
    let now = Utc::now();
    update.last_checked_at = Some(now);
    if request.mark_optimized {
        update.last_optimized_at = Some(now);
    }

    let tool = match storage.update_tool(id, &update).await {
        Ok(tool) => tool,
        Err(e) => return ApiResponse::from_error(&e, "Failed to update tool"),
    };
    let run_id = match record_run(storage, Some(id), &analysis).await {
        Ok(run_id) => run_id,
        Err(e) => return ApiResponse::from_error(&e, "Failed to record analysis run"),
    };

    let message = if updated_fields.is_empty() {
        "Tool analyzed successfully, no updates needed".to_string()
    } else {
        format!(
            "Tool analyzed and {} fields updated successfully",
            updated_fields.len()
        )
    };
    info!(updated = updated_fields.len(), %run_id, "tool analyzed");

    ApiResponse::ok(
        200,
        AnalyzeToolData {
            tool,
            analysis,
            has_changes: !updated_fields.is_empty(),
            updated_fields,
            run_id,
        },
        Some(message),
    )
}

/// Analyze a new URL and create a catalogue entry from the result.
#[instrument(skip_all, fields(url = %raw_url))]
pub async fn import_tool<F: PageFetcher, G: TextGenerator>(
    storage: &Storage,
    enricher: &Enricher<F, G>,
    raw_url: &str,
    progress: &dyn EnrichmentProgress,
) -> ApiResponse<ImportToolData> {
    let url = match validate_url(raw_url) {
        Ok(url) => url,
        Err(e) => return ApiResponse::failure(400, e.to_string(), None),
    };

    let analysis = match enricher.enrich(&url, progress).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "import analysis failed");
            return ApiResponse::failure(
                500,
                "Failed to analyze the provided URL",
                Some(e.to_string()),
            );
        }
    };

    let tool = match storage.insert_tool(&new_tool(&analysis)).await {
        Ok(tool) => tool,
        Err(e) => return ApiResponse::from_error(&e, "Failed to import tool"),
    };
    let run_id = match record_run(storage, Some(tool.id), &analysis).await {
        Ok(run_id) => run_id,
        Err(e) => return ApiResponse::from_error(&e, "Failed to record analysis run"),
    };

    info!(tool_id = tool.id, slug = %tool.slug, "tool imported");
    ApiResponse::ok(
        201,
        ImportToolData {
            tool,
            analysis,
            run_id,
        },
        Some("Tool imported successfully".into()),
    )
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Compute the update for `fields`, keeping only values that are non-empty
/// in the analysis and differ from the stored tool.
pub fn plan_update(
    tool: &Tool,
    analysis: &ToolAnalysis,
    fields: &[ToolField],
) -> (ToolUpdate, Vec<ToolField>) {
    let mut update = ToolUpdate::default();
    let mut updated = Vec::new();

    for &field in fields {
        if updated.contains(&field) {
            continue;
        }
        let (current, proposed) = match field {
            ToolField::ToolName => (Some(tool.name.as_str()), analysis.tool_name.clone()),
            ToolField::ToolCategory => (tool.category.as_deref(), analysis.category.clone()),
            ToolField::Overview => (tool.overview.as_deref(), analysis.primary_function.clone()),
            ToolField::ToolDescription => {
                (tool.description.as_deref(), analysis.description.clone())
            }
            ToolField::TargetAudience => (
                tool.target_audience.as_deref(),
                analysis.target_audience.join(", "),
            ),
            ToolField::KeyFeatures => {
                (tool.key_features.as_deref(), analysis.key_features.join(", "))
            }
            ToolField::Tags => (tool.tags.as_deref(), analysis.tags.join(", ")),
            ToolField::MetaTitle => (tool.meta_title.as_deref(), analysis.meta_title.clone()),
            ToolField::MetaDescription => (
                tool.meta_description.as_deref(),
                analysis.meta_description.clone(),
            ),
            ToolField::SeoKeywords => (tool.seo_keywords.as_deref(), analysis.tags.join(", ")),
        };

        if proposed.trim().is_empty() || current == Some(proposed.as_str()) {
            continue;
        }

        let slot = match field {
            ToolField::ToolName => &mut update.name,
            ToolField::ToolCategory => &mut update.category,
            ToolField::Overview => &mut update.overview,
            ToolField::ToolDescription => &mut update.description,
            ToolField::TargetAudience => &mut update.target_audience,
            ToolField::KeyFeatures => &mut update.key_features,
            ToolField::Tags => &mut update.tags,
            ToolField::MetaTitle => &mut update.meta_title,
            ToolField::MetaDescription => &mut update.meta_description,
            ToolField::SeoKeywords => &mut update.seo_keywords,
        };
        *slot = Some(proposed);
        updated.push(field);
    }

    (update, updated)
}

fn new_tool(analysis: &ToolAnalysis) -> NewTool {
    let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);
    NewTool {
        slug: analysis.slug.clone(),
        name: analysis.tool_name.clone(),
        link: Some(analysis.url.clone()),
        category: non_empty(analysis.category.clone()),
        overview: non_empty(analysis.primary_function.clone()),
        description: non_empty(analysis.description.clone()),
        target_audience: non_empty(analysis.target_audience.join(", ")),
        key_features: non_empty(analysis.key_features.join(", ")),
        tags: non_empty(analysis.tags.join(", ")),
        meta_title: non_empty(analysis.meta_title.clone()),
        meta_description: non_empty(analysis.meta_description.clone()),
        seo_keywords: non_empty(analysis.tags.join(", ")),
        quality_score: Some(f64::from(analysis.completeness_score)),
        featured: false,
    }
}

async fn record_run(
    storage: &Storage,
    tool_id: Option<i64>,
    analysis: &ToolAnalysis,
) -> toolscout_shared::Result<String> {
    let json = serde_json::to_string(analysis)
        .map_err(|e| ToolScoutError::parse(format!("failed to serialize analysis: {e}")))?;
    storage
        .record_analysis_run(
            tool_id,
            &analysis.url,
            analysis.source.label(),
            &analysis.content_hash,
            &json,
        )
        .await
}
