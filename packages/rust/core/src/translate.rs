//! Translation of the descriptive fields into a target language.

use serde::Deserialize;
use tracing::{info, instrument};

use toolscout_shared::{Result, ToolAnalysis, ToolScoutError, Translation};

use crate::ai::{GenerationProfile, TextGenerator, extract_json_object};
use crate::prompts::translation_prompt;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TranslationReply {
    tool_name: String,
    primary_function: String,
    key_features: Vec<String>,
    target_audience: Vec<String>,
    description: String,
    meta_title: String,
    meta_description: String,
    pricing_summary: String,
}

/// Translate `analysis` into `language` (ISO 639-1). Fails when the model
/// errors, the reply is not JSON, or the translated tool name is empty.
#[instrument(skip_all, fields(tool = %analysis.tool_name, %language))]
pub async fn translate<G: TextGenerator>(
    generator: &G,
    analysis: &ToolAnalysis,
    language: &str,
    site_name: &str,
) -> Result<Translation> {
    let prompt = translation_prompt(analysis, language, site_name);
    let reply = generator
        .generate(&prompt, GenerationProfile::Translation)
        .await?;

    let json = extract_json_object(&reply.text)
        .ok_or_else(|| ToolScoutError::parse("no JSON object in translation reply"))?;
    let parsed: TranslationReply = serde_json::from_str(&json)
        .map_err(|e| ToolScoutError::parse(format!("invalid translation reply: {e}")))?;

    if parsed.tool_name.trim().is_empty() {
        return Err(ToolScoutError::parse("translation reply is missing toolName"));
    }

    info!(model = %reply.model, "translation complete");
    Ok(Translation {
        language: language.to_string(),
        tool_name: parsed.tool_name,
        primary_function: parsed.primary_function,
        key_features: parsed.key_features,
        target_audience: parsed.target_audience,
        description: parsed.description,
        meta_title: parsed.meta_title,
        meta_description: parsed.meta_description,
        pricing_summary: parsed.pricing_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedGenerator, good_translation_reply, sample_analysis};

    #[tokio::test]
    async fn parses_translation() {
        let generator = ScriptedGenerator::new().translation(Ok(good_translation_reply()));
        let t = translate(&generator, &sample_analysis(), "fr", "Video-IA.net")
            .await
            .unwrap();
        assert_eq!(t.language, "fr");
        assert_eq!(t.tool_name, "PixelForge");
        assert_eq!(t.key_features.len(), 2);
        assert_eq!(t.pricing_summary, "Modèle freemium.");
    }

    #[tokio::test]
    async fn empty_tool_name_is_an_error() {
        let reply = r#"{"toolName": "  ", "primaryFunction": "x"}"#;
        let generator = ScriptedGenerator::new().translation(Ok(reply.into()));
        let err = translate(&generator, &sample_analysis(), "fr", "Video-IA.net")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolScoutError::Parse { .. }));
        assert!(err.to_string().contains("toolName"));
    }

    #[tokio::test]
    async fn unparsable_reply_is_an_error() {
        let generator = ScriptedGenerator::new().translation(Ok("désolé".into()));
        let err = translate(&generator, &sample_analysis(), "fr", "Video-IA.net")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolScoutError::Parse { .. }));
    }

    #[tokio::test]
    async fn generator_failure_propagates() {
        let generator = ScriptedGenerator::new().translation(Err("overloaded".into()));
        assert!(
            translate(&generator, &sample_analysis(), "fr", "Video-IA.net")
                .await
                .is_err()
        );
    }
}
