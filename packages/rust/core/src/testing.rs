//! Test doubles and fixtures shared by the core unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use url::Url;

use toolscout_fetcher::PageFetcher;
use toolscout_shared::{
    AffiliateInfo, AnalysisSource, ContactInfo, PageLink, PageMetadata, PricingDetails,
    PricingModel, Result, ScrapedPage, ToolAnalysis, ToolScoutError,
};

use crate::ai::{GenerationProfile, Generated, TextGenerator};

/// A page with no signals at all.
pub(crate) fn blank_page() -> ScrapedPage {
    ScrapedPage {
        url: "https://example.com/".into(),
        final_url: "https://example.com/".into(),
        status_code: 200,
        fetched_at: Utc::now(),
        content_hash: "0".repeat(64),
        title: String::new(),
        description: String::new(),
        content: String::new(),
        metadata: PageMetadata::default(),
        social_links: Default::default(),
        contact_info: ContactInfo::default(),
        pricing: Vec::new(),
        features: Vec::new(),
        links: Vec::new(),
        logo_url: None,
    }
}

/// A typical AI image generator landing page.
pub(crate) fn sample_page() -> ScrapedPage {
    ScrapedPage {
        url: "https://pixelforge.ai/".into(),
        final_url: "https://pixelforge.ai/".into(),
        content_hash: "ab".repeat(32),
        title: "PixelForge | AI image generator".into(),
        description: "Create stunning visuals from text prompts.".into(),
        content: [
            "PixelForge turns text prompts into images in seconds.",
            "Our AI image generation engine creates images for marketing and design teams.",
            "Free plan available",
            "pricing starts at $10/mo",
            "Join our affiliate program and earn 30% commission.",
        ]
        .join("\n"),
        metadata: PageMetadata {
            description: "Create stunning visuals from text prompts.".into(),
            keywords: vec!["ai art".into(), "image generator".into()],
            og_title: "PixelForge".into(),
            og_description: String::new(),
        },
        social_links: [
            ("twitter".to_string(), "https://twitter.com/pixelforge".to_string()),
            ("github".to_string(), "https://github.com/pixelforge".to_string()),
        ]
        .into_iter()
        .collect(),
        contact_info: ContactInfo {
            email: Some("hello@pixelforge.ai".into()),
            phone: None,
            contact_form_url: Some("https://pixelforge.ai/contact".into()),
            support_url: None,
        },
        pricing: vec!["Free plan available".into(), "Pro plan $10/mo".into()],
        features: vec![
            "Text-to-image generation in seconds".into(),
            "Batch export to PNG and SVG".into(),
            "Brand style presets".into(),
        ],
        links: vec![
            PageLink {
                href: "https://pixelforge.ai/pricing".into(),
                text: "Pricing".into(),
            },
            PageLink {
                href: "https://pixelforge.ai/affiliates".into(),
                text: "Affiliates".into(),
            },
        ],
        logo_url: Some("https://pixelforge.ai/logo.png".into()),
        ..blank_page()
    }
}

/// A finished analysis of [`sample_page`].
pub(crate) fn sample_analysis() -> ToolAnalysis {
    ToolAnalysis {
        url: "https://pixelforge.ai/".into(),
        tool_name: "PixelForge".into(),
        slug: "pixelforge".into(),
        primary_function: "Generates images from text".into(),
        key_features: vec!["Text-to-image".into()],
        target_audience: vec!["Designers".into()],
        category: "Image Generation".into(),
        description: "<h2>What is PixelForge?</h2>".into(),
        meta_title: "PixelForge - Video-IA.net".into(),
        meta_description: "Create images.".into(),
        tags: vec!["ai".into()],
        recommended_actions: vec![],
        confidence: 80,
        data_completeness: 80,
        completeness_score: 0,
        source: AnalysisSource::Ai {
            model: "stub-model".into(),
        },
        pricing_details: PricingDetails {
            model: PricingModel::Freemium,
            plans: vec![],
            free_tier: true,
            paid_plans: true,
            enterprise_available: false,
            notes: String::new(),
        },
        pricing_summary: "Freemium pricing model.".into(),
        affiliate_info: AffiliateInfo {
            has_affiliate_program: false,
            program_url: None,
            contact_email: None,
            contact_form: None,
            notes: String::new(),
        },
        social_links: Default::default(),
        contact_info: ContactInfo::default(),
        logo_url: None,
        translation: None,
        warnings: vec![],
        content_hash: String::new(),
        analyzed_at: Utc::now(),
    }
}

/// A well-formed analysis reply for [`sample_page`].
pub(crate) fn good_analysis_reply() -> String {
    let description = format!(
        "<h2>What is PixelForge?</h2><p>{}</p>",
        "PixelForge generates on-brand images from short text prompts. ".repeat(10)
    );
    serde_json::json!({
        "toolName": "PixelForge",
        "primaryFunction": "Generates images from text prompts",
        "keyFeatures": ["Text-to-image", "Batch export", "Style presets"],
        "targetAudience": ["Designers", "Marketers"],
        "pricingModel": "Freemium",
        "category": "Image Generation",
        "description": description,
        "metaTitle": "PixelForge - AI Image Generator - Video-IA.net",
        "metaDescription": "Create on-brand images from text with PixelForge. Try it free today!",
        "tags": ["ai", "image", "design"],
        "confidence": 88,
        "dataCompleteness": 90,
        "recommendedActions": ["Add API documentation link"],
        "pricingDetails": {
            "model": "Freemium",
            "plans": [
                { "name": "Pro", "price": "$10/mo", "features": ["HD exports"], "billing": "monthly" }
            ]
        }
    })
    .to_string()
}

/// A well-formed French translation reply.
pub(crate) fn good_translation_reply() -> String {
    serde_json::json!({
        "toolName": "PixelForge",
        "primaryFunction": "Génère des images à partir de texte",
        "keyFeatures": ["Texte vers image", "Export par lots"],
        "targetAudience": ["Designers", "Marketeurs"],
        "description": "<h2>Qu'est-ce que PixelForge ?</h2>",
        "metaTitle": "PixelForge - Générateur d'images IA - Video-IA.net",
        "metaDescription": "Créez des images avec PixelForge.",
        "pricingSummary": "Modèle freemium."
    })
    .to_string()
}

/// Returns a fixed page, or an HTTP 500 fetch error when none is set.
pub(crate) struct StubFetcher {
    pub page: Option<ScrapedPage>,
}

impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<ScrapedPage> {
        match &self.page {
            Some(page) => {
                let mut page = page.clone();
                page.url = url.to_string();
                Ok(page)
            }
            None => Err(ToolScoutError::Fetch("HTTP 500".into())),
        }
    }
}

type Script = Mutex<VecDeque<std::result::Result<String, String>>>;

/// Replays queued replies per generation profile. An exhausted queue fails.
#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    analysis: Script,
    translation: Script,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(self, reply: std::result::Result<String, String>) -> Self {
        self.analysis.lock().unwrap().push_back(reply);
        self
    }

    pub fn translation(self, reply: std::result::Result<String, String>) -> Self {
        self.translation.lock().unwrap().push_back(reply);
        self
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str, profile: GenerationProfile) -> Result<Generated> {
        let queue = match profile {
            GenerationProfile::Analysis => &self.analysis,
            GenerationProfile::Translation => &self.translation,
        };
        let next = queue.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Generated {
                text,
                model: "stub-model".into(),
            }),
            Some(Err(message)) => Err(ToolScoutError::Ai(message)),
            None => Err(ToolScoutError::Ai("no scripted reply".into())),
        }
    }
}
