//! HTTP page fetcher.
//!
//! Fetches one tool website, validates the response, and hands the body to
//! [`crate::extract`] to build a [`ScrapedPage`].

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use url::{Host, Url};

use toolscout_shared::{FetchConfig, Result, ScrapedPage, ToolScoutError};

use crate::PageFetcher;
use crate::extract::{ExtractLimits, extract_page};

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Fetches tool websites over HTTP(S).
pub struct HttpFetcher {
    client: Client,
    limits: ExtractLimits,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_private_hosts: bool,
}

impl HttpFetcher {
    /// Create a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(redirect_policy(config.max_redirects, config.allow_private_hosts))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToolScoutError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            limits: ExtractLimits::from(config),
            allow_private_hosts: config.allow_private_hosts,
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<ScrapedPage> {
        if !self.allow_private_hosts && is_ssrf_target(url) {
            warn!("SSRF protection: blocked");
            return Err(ToolScoutError::Fetch(format!(
                "{url}: refusing to fetch a private or non-HTTP address"
            )));
        }

        debug!("fetching page");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ToolScoutError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolScoutError::Fetch(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(ct) = content_type.as_deref().filter(|ct| !is_textual(ct)) {
            return Err(ToolScoutError::Fetch(format!(
                "{url}: unsupported content type {ct}"
            )));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ToolScoutError::Fetch(format!("{url}: body read failed: {e}")))?;

        let page = build_page(url, &final_url, status.as_u16(), &body, &self.limits)?;

        info!(
            final_url = %page.final_url,
            content_len = page.content.len(),
            pricing = page.pricing.len(),
            features = page.features.len(),
            "page fetched"
        );
        Ok(page)
    }
}

/// Turn a response body into a [`ScrapedPage`].
///
/// Fails when the body is blank or carries neither a title nor any visible text.
pub fn build_page(
    url: &Url,
    final_url: &Url,
    status_code: u16,
    body: &str,
    limits: &ExtractLimits,
) -> Result<ScrapedPage> {
    if body.trim().is_empty() {
        return Err(ToolScoutError::Fetch(format!("{url}: empty response body")));
    }

    let signals = extract_page(body, final_url, limits);
    if signals.title.is_empty() && signals.content.is_empty() {
        return Err(ToolScoutError::Fetch(format!(
            "{url}: page has no title and no readable text"
        )));
    }

    Ok(ScrapedPage {
        url: url.to_string(),
        final_url: final_url.to_string(),
        status_code,
        fetched_at: Utc::now(),
        content_hash: compute_hash(body),
        title: signals.title,
        description: signals.description,
        content: signals.content,
        metadata: signals.metadata,
        social_links: signals.social_links,
        contact_info: signals.contact_info,
        pricing: signals.pricing,
        features: signals.features,
        links: signals.links,
        logo_url: signals.logo_url,
    })
}

/// Follow at most `max_redirects` hops, and never into a private or non-HTTP target
/// unless private hosts are allowed.
fn redirect_policy(max_redirects: usize, allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        // `previous` starts with the original request.
        if attempt.previous().len() > max_redirects {
            attempt.error(format!("too many redirects (max {max_redirects})"))
        } else if !allow_private_hosts && is_ssrf_target(attempt.url()) {
            warn!(target_url = %attempt.url(), "SSRF protection: redirect blocked");
            let message = format!("redirect to blocked address {}", attempt.url());
            attempt.error(message)
        } else {
            attempt.follow()
        }
    })
}

fn is_textual(content_type: &str) -> bool {
    content_type.contains("html") || content_type.starts_with("text/")
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(Host::Domain(host)) => {
            host == "localhost" || host.ends_with(".local") || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
                // 192.0.0.0/24
                || (v4.octets()[0] == 192 && v4.octets()[1] == 0 && v4.octets()[2] == 0)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                // fe80::/10 (link local)
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
