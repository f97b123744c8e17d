//! Website fetching and signal extraction.
//!
//! This crate provides:
//! - [`PageFetcher`]: the seam the enrichment pipeline fetches through
//! - [`HttpFetcher`]: the reqwest-backed implementation
//! - [`extract`]: pure HTML → signals extraction
//! - [`validate_url`]: input URL validation

use std::future::Future;

use url::Url;

use toolscout_shared::{Result, ScrapedPage, ToolScoutError};

pub mod engine;
pub mod extract;

pub use engine::{HttpFetcher, build_page};
pub use extract::{ExtractLimits, PageSignals, extract_page};

/// Fetches a tool website and returns its content and pre-extracted signals.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<ScrapedPage>> + Send;
}

/// Parse a user-supplied website URL. Only absolute `http`/`https` URLs with
/// a host are accepted.
pub fn validate_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ToolScoutError::validation("URL is required"));
    }
    let url = Url::parse(raw)
        .map_err(|e| ToolScoutError::validation(format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToolScoutError::validation(format!(
            "invalid URL '{raw}': only http and https are supported"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ToolScoutError::validation(format!(
            "invalid URL '{raw}': missing host"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_accepts_web_urls() {
        let url = validate_url(" https://acme.ai/pricing ").unwrap();
        assert_eq!(url.host_str(), Some("acme.ai"));
        assert!(validate_url("http://acme.ai").is_ok());
    }

    #[test]
    fn validate_url_rejects_garbage() {
        for raw in ["", "not a url", "acme.ai", "ftp://acme.ai/", "mailto:a@b.c"] {
            let err = validate_url(raw).unwrap_err();
            assert!(
                matches!(err, ToolScoutError::Validation { .. }),
                "{raw} should be rejected"
            );
        }
    }
}
