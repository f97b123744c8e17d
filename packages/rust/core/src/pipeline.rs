//! Enrichment pipeline: one URL in, one [`ToolAnalysis`] out.
//!
//! 1. Fetch the page
//! 2. Pricing analysis
//! 3. Affiliate analysis
//! 4. Primary analysis (AI, with heuristic fallback)
//! 5. Translation (best effort)
//! 6. Completeness scoring

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};
use url::Url;

use toolscout_fetcher::PageFetcher;
use toolscout_shared::{AnalysisSource, AppConfig, PricingModel, Result, ToolAnalysis};

use crate::ai::TextGenerator;
use crate::analyzers::{analyze_affiliate, analyze_pricing, analyze_primary};
use crate::content::pricing_summary;
use crate::translate::translate;

/// Pipeline settings that do not belong to the fetcher or the AI client.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Directory name used in meta titles.
    pub site_name: String,
    /// ISO 639-1 code to translate into; `None` skips translation.
    pub target_language: Option<String>,
    /// Characters of page content included in the analysis prompt.
    pub content_char_limit: usize,
}

impl EnrichOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            site_name: config.catalogue.site_name.clone(),
            target_language: config
                .translation
                .enabled
                .then(|| config.translation.target_language.clone()),
            content_char_limit: config.ai.content_char_limit,
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait EnrichmentProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentEnrichmentProgress;

impl EnrichmentProgress for SilentEnrichmentProgress {
    fn phase(&self, _name: &str) {}
}

/// Runs the enrichment pipeline over a fetcher and a text generator.
///
/// Holds only immutable clients, so one instance can serve concurrent calls.
pub struct Enricher<F, G> {
    fetcher: F,
    generator: G,
    options: EnrichOptions,
}

impl<F: PageFetcher, G: TextGenerator> Enricher<F, G> {
    pub fn new(fetcher: F, generator: G, options: EnrichOptions) -> Self {
        Self {
            fetcher,
            generator,
            options,
        }
    }

    /// Produce a [`ToolAnalysis`] for `url`. Only a fetch failure is an error;
    /// AI and translation failures degrade into `warnings`.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn enrich(
        &self,
        url: &Url,
        progress: &dyn EnrichmentProgress,
    ) -> Result<ToolAnalysis> {
        let start = Instant::now();
        info!("starting enrichment");

        progress.phase("Fetching website");
        let page = self.fetcher.fetch(url).await?;

        progress.phase("Analyzing pricing");
        let mut pricing = analyze_pricing(&page);

        progress.phase("Checking affiliate program");
        let affiliate = analyze_affiliate(&page);

        progress.phase("Analyzing tool");
        let outcome = analyze_primary(
            &self.generator,
            &page,
            &self.options.site_name,
            self.options.content_char_limit,
        )
        .await;
        let (profile, source) = outcome.into_parts();

        let mut warnings = Vec::new();
        if let AnalysisSource::Heuristic { reason } = &source {
            warnings.push(format!(
                "AI analysis unavailable, used heuristic profile: {reason}"
            ));
        }
        if pricing.plans.is_empty() && !profile.plans.is_empty() {
            pricing.plans = profile.plans;
        }

        let mut analysis = ToolAnalysis {
            url: page.final_url.clone(),
            tool_name: profile.tool_name,
            slug: profile.slug,
            primary_function: profile.primary_function,
            key_features: profile.key_features,
            target_audience: profile.target_audience,
            category: profile.category,
            description: profile.description,
            meta_title: profile.meta_title,
            meta_description: profile.meta_description,
            tags: profile.tags,
            recommended_actions: profile.recommended_actions,
            confidence: profile.confidence,
            data_completeness: profile.data_completeness,
            completeness_score: 0,
            source,
            pricing_summary: pricing_summary(&pricing),
            pricing_details: pricing,
            affiliate_info: affiliate,
            social_links: page.social_links,
            contact_info: page.contact_info,
            logo_url: page.logo_url,
            translation: None,
            warnings,
            content_hash: page.content_hash,
            analyzed_at: Utc::now(),
        };

        if let Some(language) = &self.options.target_language {
            progress.phase("Translating");
            match translate(&self.generator, &analysis, language, &self.options.site_name).await
            {
                Ok(translation) => analysis.translation = Some(translation),
                Err(e) => {
                    warn!(%language, error = %e, "translation failed, omitting it");
                    analysis
                        .warnings
                        .push(format!("translation to {language} skipped: {e}"));
                }
            }
        }

        progress.phase("Scoring");
        analysis.completeness_score = completeness_score(&analysis);

        info!(
            tool = %analysis.tool_name,
            source = analysis.source.label(),
            score = analysis.completeness_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "enrichment complete"
        );
        Ok(analysis)
    }
}

/// Weighted share of filled fields: 11 required fields carry 80 points,
/// 7 optional ones carry 20.
pub fn completeness_score(analysis: &ToolAnalysis) -> u8 {
    let filled = |s: &str| !s.trim().is_empty();

    let required = [
        filled(&analysis.tool_name),
        filled(&analysis.primary_function),
        !analysis.key_features.is_empty(),
        !analysis.target_audience.is_empty(),
        analysis.pricing_details.model != PricingModel::Unknown,
        filled(&analysis.category),
        filled(&analysis.description),
        filled(&analysis.meta_title),
        filled(&analysis.meta_description),
        !analysis.tags.is_empty(),
        analysis.confidence > 0,
    ];
    let optional = [
        !analysis.social_links.is_empty(),
        !analysis.contact_info.is_empty(),
        analysis.logo_url.is_some(),
        !analysis.pricing_details.plans.is_empty(),
        analysis.affiliate_info.has_affiliate_program,
        analysis.translation.is_some(),
        analysis.source.is_ai(),
    ];

    (share(&required) * 80.0 + share(&optional) * 20.0).round() as u8
}

fn share(flags: &[bool]) -> f64 {
    flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::HEURISTIC_CONFIDENCE;
    use crate::testing::{
        ScriptedGenerator, StubFetcher, good_analysis_reply, good_translation_reply,
        sample_analysis, sample_page,
    };
    use std::sync::Mutex;
    use toolscout_shared::{ScrapedPage, ToolScoutError};

    fn options(language: Option<&str>) -> EnrichOptions {
        EnrichOptions {
            site_name: "Video-IA.net".into(),
            target_language: language.map(str::to_string),
            content_char_limit: 4000,
        }
    }

    fn enricher(
        page: Option<ScrapedPage>,
        generator: ScriptedGenerator,
        language: Option<&str>,
    ) -> Enricher<StubFetcher, ScriptedGenerator> {
        Enricher::new(StubFetcher { page }, generator, options(language))
    }

    fn url() -> Url {
        Url::parse("https://pixelforge.ai/").unwrap()
    }

    #[derive(Default)]
    struct RecordingProgress(Mutex<Vec<String>>);

    impl EnrichmentProgress for RecordingProgress {
        fn phase(&self, name: &str) {
            self.0.lock().unwrap().push(name.to_string());
        }
    }

    #[tokio::test]
    async fn full_ai_run() {
        let generator = ScriptedGenerator::new()
            .analysis(Ok(good_analysis_reply()))
            .translation(Ok(good_translation_reply()));
        let progress = RecordingProgress::default();
        let analysis = enricher(Some(sample_page()), generator, Some("fr"))
            .enrich(&url(), &progress)
            .await
            .unwrap();

        assert_eq!(analysis.tool_name, "PixelForge");
        assert!(analysis.source.is_ai());
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.pricing_details.model, PricingModel::Freemium);
        assert_eq!(
            analysis.pricing_summary,
            "Freemium pricing model. Free tier available. Paid plans start from $10/mo."
        );
        assert!(analysis.affiliate_info.has_affiliate_program);
        assert_eq!(analysis.translation.as_ref().unwrap().language, "fr");
        assert_eq!(analysis.content_hash, "ab".repeat(32));
        assert_eq!(analysis.completeness_score, 100);
        assert_eq!(
            *progress.0.lock().unwrap(),
            vec![
                "Fetching website",
                "Analyzing pricing",
                "Checking affiliate program",
                "Analyzing tool",
                "Translating",
                "Scoring",
            ]
        );
    }

    #[tokio::test]
    async fn ai_failure_uses_heuristic_profile() {
        let generator = ScriptedGenerator::new().analysis(Err("HTTP 503".into()));
        let analysis = enricher(Some(sample_page()), generator, None)
            .enrich(&url(), &SilentEnrichmentProgress)
            .await
            .unwrap();

        assert!(!analysis.source.is_ai());
        assert_eq!(analysis.confidence, HEURISTIC_CONFIDENCE);
        assert!(!analysis.tool_name.is_empty());
        assert!(!analysis.category.is_empty());
        assert_eq!(analysis.warnings.len(), 1);
        assert!(analysis.warnings[0].starts_with("AI analysis unavailable"));
        assert!(analysis.translation.is_none());
    }

    #[tokio::test]
    async fn translation_failure_is_omitted() {
        let generator = ScriptedGenerator::new()
            .analysis(Ok(good_analysis_reply()))
            .translation(Ok("not json".into()));
        let analysis = enricher(Some(sample_page()), generator, Some("fr"))
            .enrich(&url(), &SilentEnrichmentProgress)
            .await
            .unwrap();

        assert!(analysis.source.is_ai());
        assert!(analysis.translation.is_none());
        assert_eq!(analysis.warnings.len(), 1);
        assert!(analysis.warnings[0].starts_with("translation to fr skipped"));
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let generator = ScriptedGenerator::new().analysis(Ok(good_analysis_reply()));
        let err = enricher(None, generator, Some("fr"))
            .enrich(&url(), &SilentEnrichmentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolScoutError::Fetch(_)));
    }

    #[tokio::test]
    async fn ai_plans_fill_empty_pricing() {
        let mut page = sample_page();
        page.pricing.clear();
        let generator = ScriptedGenerator::new().analysis(Ok(good_analysis_reply()));
        let analysis = enricher(Some(page), generator, None)
            .enrich(&url(), &SilentEnrichmentProgress)
            .await
            .unwrap();
        assert_eq!(analysis.pricing_details.plans.len(), 1);
        assert_eq!(analysis.pricing_details.plans[0].name, "Pro");
    }

    #[test]
    fn completeness_score_weights() {
        let mut analysis = sample_analysis();
        // all 11 required, optional: ai source only
        assert_eq!(completeness_score(&analysis), 83);

        analysis.tool_name.clear();
        analysis.pricing_details.model = PricingModel::Unknown;
        analysis.source = AnalysisSource::Heuristic {
            reason: "no key".into(),
        };
        assert_eq!(completeness_score(&analysis), 65);
    }

    #[test]
    fn options_from_config() {
        let mut config = AppConfig::default();
        config.translation.enabled = false;
        assert!(EnrichOptions::from_config(&config).target_language.is_none());
        config.translation.enabled = true;
        config.translation.target_language = "de".into();
        assert_eq!(
            EnrichOptions::from_config(&config).target_language.as_deref(),
            Some("de")
        );
    }
}
