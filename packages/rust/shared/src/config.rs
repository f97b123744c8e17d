//! Application configuration for ToolScout.
//!
//! User config lives at `~/.toolscout/toolscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "toolscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".toolscout";

/// Default catalogue database file name inside the config directory.
const DATABASE_FILE_NAME: &str = "catalogue.db";

// ---------------------------------------------------------------------------
// Config structs (matching toolscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Website fetching.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// AI service settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Localization of analysis results.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Catalogue storage and SEO defaults.
    #[serde(default)]
    pub catalogue: CatalogueConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent to target sites.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Allow loopback/private network targets (off outside of tests).
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Maximum pricing mentions kept per page.
    #[serde(default = "default_max_pricing_mentions")]
    pub max_pricing_mentions: usize,

    /// Maximum feature mentions kept per page.
    #[serde(default = "default_max_feature_mentions")]
    pub max_feature_mentions: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            allow_private_hosts: false,
            max_pricing_mentions: default_max_pricing_mentions(),
            max_feature_mentions: default_max_feature_mentions(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}
fn default_user_agent() -> String {
    concat!("ToolScout/", env!("CARGO_PKG_VERSION")).into()
}
fn default_max_pricing_mentions() -> usize {
    10
}
fn default_max_feature_mentions() -> usize {
    20
}

/// `[ai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the generative language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Models tried in order when the previous one is overloaded.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// How many characters of page content go into the analysis prompt.
    #[serde(default = "default_content_char_limit")]
    pub content_char_limit: usize,

    /// Request timeout for AI calls, in seconds.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            models: default_models(),
            content_char_limit: default_content_char_limit(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".into(),
        "gemini-1.5-pro".into(),
        "gemini-2.0-flash-lite".into(),
    ]
}
fn default_content_char_limit() -> usize {
    4_000
}
fn default_ai_timeout_secs() -> u64 {
    60
}

/// `[translation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Whether analyses get a localized block.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// ISO 639-1 code of the second language.
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_language: default_target_language(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_target_language() -> String {
    "fr".into()
}

/// `[catalogue]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// Database path. Defaults to `~/.toolscout/catalogue.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,

    /// Site name appended to generated meta titles.
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            site_name: default_site_name(),
        }
    }
}

fn default_site_name() -> String {
    "Video-IA.net".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.toolscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ToolScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.toolscout/toolscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ToolScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ToolScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ToolScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ToolScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ToolScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the catalogue database path (config value or the default location).
pub fn database_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.catalogue.database_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Ok(config_dir()?.join(DATABASE_FILE_NAME)),
    }
}

/// Read the AI API key from the env var named in config.
///
/// `None` means AI-backed steps will fail and the pipeline degrades to
/// heuristics without translation.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.ai.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => {
            tracing::warn!(
                env = %config.ai.api_key_env,
                "AI API key not set, analysis will use heuristic fallback"
            );
            None
        }
    }
}
