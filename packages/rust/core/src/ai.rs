//! Generative-language client.
//!
//! [`TextGenerator`] is the seam the analyzers and the translator are generic
//! over; [`GeminiClient`] is the REST implementation with model fallback.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use toolscout_shared::{AiConfig, AppConfig, Result, ToolScoutError, resolve_api_key};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Sampling preset for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProfile {
    /// Structured extraction: low temperature.
    Analysis,
    /// Natural-sounding translation.
    Translation,
}

impl GenerationProfile {
    fn config(self) -> GenerationConfig {
        match self {
            Self::Analysis => GenerationConfig {
                temperature: 0.3,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 4096,
            },
            Self::Translation => GenerationConfig {
                temperature: 0.4,
                top_p: 0.85,
                top_k: 45,
                max_output_tokens: 3072,
            },
        }
    }
}

/// A model reply.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    /// The model that produced `text`.
    pub model: String,
}

/// Produces text from a prompt.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        profile: GenerationProfile,
    ) -> impl Future<Output = Result<Generated>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
    role: &'static str,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Why a single model call failed.
#[derive(Debug)]
enum ModelFailure {
    /// Capacity problem; the next model may succeed.
    Overloaded(String),
    /// Anything else.
    Fatal(String),
}

/// Gemini REST client trying each configured model in turn.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    models: Vec<String>,
}

impl GeminiClient {
    /// Create a client. Without an API key every call fails with an AI error.
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToolScoutError::Ai(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            models: config.models.clone(),
        })
    }

    /// Create a client from app config, reading the key from the configured env var.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.ai, resolve_api_key(config))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call_model(
        &self,
        model: &str,
        api_key: &str,
        prompt: &str,
        profile: GenerationProfile,
    ) -> std::result::Result<String, ModelFailure> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
                role: "user",
            }],
            generation_config: profile.config(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelFailure::Fatal(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelFailure::Fatal(format!("body read failed: {e}")))?;

        if !status.is_success() {
            let message = format!("HTTP {status}: {}", text.trim());
            return Err(if is_overload(status, &text) {
                ModelFailure::Overloaded(message)
            } else {
                ModelFailure::Fatal(message)
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ModelFailure::Fatal(format!("invalid response: {e}")))?;
        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(ModelFailure::Fatal("no response text".into()));
        }
        Ok(reply)
    }
}

impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(profile = ?profile))]
    async fn generate(&self, prompt: &str, profile: GenerationProfile) -> Result<Generated> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolScoutError::Ai("no API key configured".into()))?;
        if self.models.is_empty() {
            return Err(ToolScoutError::config("no AI models configured"));
        }

        let last = self.models.len() - 1;
        for (i, model) in self.models.iter().enumerate() {
            debug!(%model, "calling model");
            match self.call_model(model, api_key, prompt, profile).await {
                Ok(text) => {
                    info!(%model, chars = text.len(), "model replied");
                    return Ok(Generated {
                        text,
                        model: model.clone(),
                    });
                }
                Err(ModelFailure::Overloaded(msg)) if i < last => {
                    warn!(%model, error = %msg, "model overloaded, trying next model");
                }
                Err(ModelFailure::Overloaded(msg) | ModelFailure::Fatal(msg)) => {
                    return Err(ToolScoutError::Ai(format!("{model}: {msg}")));
                }
            }
        }

        Err(ToolScoutError::Ai("all models failed".into()))
    }
}

fn is_overload(status: StatusCode, body: &str) -> bool {
    if matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    ) {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("overloaded") || body.contains("UNAVAILABLE") || lower.contains("rate limit")
}

/// Strip code fences and return the slice from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<String> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    (end > start).then(|| cleaned[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, models: &[&str], key: Option<&str>) -> GeminiClient {
        let config = AiConfig {
            base_url: server.uri(),
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        };
        GeminiClient::new(&config, key.map(String::from)).unwrap()
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        }))
    }

    #[test]
    fn extract_json_from_fenced_reply() {
        let text = "Sure!\n```json\n{\"toolName\": \"X\", \"tags\": {\"a\": 1}}\n```\nDone.";
        assert_eq!(
            extract_json_object(text).as_deref(),
            Some("{\"toolName\": \"X\", \"tags\": {\"a\": 1}}")
        );
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn overload_detection() {
        assert!(is_overload(StatusCode::SERVICE_UNAVAILABLE, ""));
        assert!(is_overload(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_overload(StatusCode::INTERNAL_SERVER_ERROR, "The model is overloaded."));
        assert!(is_overload(StatusCode::BAD_REQUEST, r#"{"status":"UNAVAILABLE"}"#));
        assert!(!is_overload(StatusCode::BAD_REQUEST, "API key not valid"));
    }

    #[tokio::test]
    async fn missing_api_key_fails() {
        let server = MockServer::start().await;
        let gemini = client(&server, &["m1"], None);
        assert!(!gemini.has_api_key());
        let err = gemini
            .generate("hi", GenerationProfile::Analysis)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolScoutError::Ai(_)));
    }

    #[tokio::test]
    async fn sends_prompt_and_generation_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/m1:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "hello" }], "role": "user" }],
                "generationConfig": { "topK": 45, "maxOutputTokens": 3072 }
            })))
            .respond_with(reply("bonjour"))
            .expect(1)
            .mount(&server)
            .await;

        let gemini = client(&server, &["m1"], Some("test-key"));
        let out = gemini
            .generate("hello", GenerationProfile::Translation)
            .await
            .unwrap();
        assert_eq!(out.text, "bonjour");
        assert_eq!(out.model, "m1");
    }

    #[tokio::test]
    async fn falls_back_to_next_model_when_overloaded() {
        let server = MockServer::start().await;
        Mock::given(path("/models/m1:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/models/m2:generateContent"))
            .respond_with(reply("{\"ok\": true}"))
            .expect(1)
            .mount(&server)
            .await;

        let gemini = client(&server, &["m1", "m2"], Some("k"));
        let out = gemini
            .generate("x", GenerationProfile::Analysis)
            .await
            .unwrap();
        assert_eq!(out.model, "m2");
    }

    #[tokio::test]
    async fn non_overload_error_stops_immediately() {
        let server = MockServer::start().await;
        Mock::given(path("/models/m1:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/models/m2:generateContent"))
            .respond_with(reply("never"))
            .expect(0)
            .mount(&server)
            .await;

        let gemini = client(&server, &["m1", "m2"], Some("k"));
        let err = gemini
            .generate("x", GenerationProfile::Analysis)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("m1"));
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn last_model_error_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
            .mount(&server)
            .await;

        let gemini = client(&server, &["m1", "m2"], Some("k"));
        let err = gemini
            .generate("x", GenerationProfile::Analysis)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("m2"));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let gemini = client(&server, &["m1"], Some("k"));
        let err = gemini
            .generate("x", GenerationProfile::Analysis)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no response text"));
    }
}
