//! Signal extraction from a fetched HTML document.
//!
//! Everything here is a pure function of `(html, base url, limits)`. The
//! downstream analyzers only ever see the [`PageSignals`] produced here, never
//! the DOM.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use toolscout_shared::{ContactInfo, FetchConfig, PageLink, PageMetadata, SocialLinks};

/// Maximum number of links kept per page.
const MAX_LINKS: usize = 200;

/// Pricing mentions longer than this are page sections, not price labels.
const MAX_PRICING_CHARS: usize = 100;

/// Feature mentions must fall inside this length window (chars).
const FEATURE_CHARS: std::ops::Range<usize> = 10..200;

/// Tags whose text never counts as visible content.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Tags stripped from the main content region in addition to [`INVISIBLE_TAGS`].
const CHROME_TAGS: &[&str] = &["nav", "header", "footer"];

/// Candidate main-content containers, most specific first.
const MAIN_SELECTORS: &[&str] = &["main", "#main", ".main", r#"[role="main"]"#];

/// Platform name → hosts that identify it.
const SOCIAL_HOSTS: &[(&str, &[&str])] = &[
    ("linkedin", &["linkedin.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("facebook", &["facebook.com", "fb.com"]),
    ("instagram", &["instagram.com"]),
    ("github", &["github.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("tiktok", &["tiktok.com"]),
    ("discord", &["discord.gg", "discord.com"]),
    ("telegram", &["t.me", "telegram.me"]),
    ("reddit", &["reddit.com"]),
    ("medium", &["medium.com"]),
    ("producthunt", &["producthunt.com"]),
    ("pinterest", &["pinterest.com"]),
    ("threads", &["threads.net"]),
    ("mastodon", &["mastodon.social"]),
    ("bluesky", &["bsky.app"]),
];

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static META_SEL: LazyLock<Selector> = LazyLock::new(|| selector("meta[content]"));
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static PRICING_SEL: LazyLock<Selector> = LazyLock::new(|| {
    selector("h1, h2, h3, h4, h5, h6, p, li, span, div, td, strong, b, a, button, label")
});
static FEATURE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("li, p, div"));

static LOGO_IMG_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"img[src*="logo"]"#,
        r#"img[alt*="logo" i]"#,
        r#"img[alt*="brand" i]"#,
        ".logo img",
        ".brand img",
        "header img",
        "nav img",
        r#"img[src*="brand"]"#,
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});
static ICON_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"link[rel="apple-touch-icon"]"#,
        r#"link[rel="icon"][sizes="32x32"]"#,
        r#"link[rel="icon"]"#,
        r#"link[rel="shortcut icon"]"#,
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid regex")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

// ---------------------------------------------------------------------------
// Limits / output
// ---------------------------------------------------------------------------

/// Caps on how many mentions are kept per page.
#[derive(Debug, Clone)]
pub struct ExtractLimits {
    pub max_pricing: usize,
    pub max_features: usize,
    pub max_links: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for ExtractLimits {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_pricing: config.max_pricing_mentions,
            max_features: config.max_feature_mentions,
            max_links: MAX_LINKS,
        }
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default)]
pub struct PageSignals {
    pub title: String,
    pub description: String,
    pub content: String,
    pub metadata: PageMetadata,
    pub social_links: SocialLinks,
    pub contact_info: ContactInfo,
    pub pricing: Vec<String>,
    pub features: Vec<String>,
    pub links: Vec<PageLink>,
    pub logo_url: Option<String>,
}

/// Extract all signals from an HTML document.
pub fn extract_page(html: &str, base: &Url, limits: &ExtractLimits) -> PageSignals {
    let doc = Html::parse_document(html);

    let metadata = extract_metadata(&doc);
    let content = main_content_text(&doc);
    let title = extract_title(&doc, &metadata);
    let description = [&metadata.description, &metadata.og_description, &title]
        .into_iter()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default();

    let anchors = resolved_anchors(&doc, base);
    let full_text = doc
        .select(&BODY_SEL)
        .next()
        .map(|body| visible_text(body, INVISIBLE_TAGS))
        .unwrap_or_default();

    PageSignals {
        title,
        description,
        content,
        social_links: extract_social_links(&anchors),
        contact_info: extract_contact_info(&anchors, &full_text),
        pricing: extract_pricing_mentions(&doc, limits.max_pricing),
        features: extract_feature_mentions(&doc, limits.max_features),
        links: collect_links(&anchors, limits.max_links),
        logo_url: extract_logo_url(&doc, base),
        metadata,
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Collapse runs of whitespace into single spaces.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text below `root`, one text run per line, skipping `skip` subtrees.
fn visible_text(root: ElementRef<'_>, skip: &[&str]) -> String {
    let root_id = root.id();
    let mut lines = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != root_id)
            .filter_map(|a| a.value().as_element())
            .any(|el| skip.contains(&el.name()));
        if hidden {
            continue;
        }
        let line = normalize_ws(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Text of the main content region with page chrome removed.
fn main_content_text(doc: &Html) -> String {
    let skip: Vec<&str> = INVISIBLE_TAGS.iter().chain(CHROME_TAGS).copied().collect();

    let root = MAIN_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| doc.select(&sel).next())
        .or_else(|| doc.select(&BODY_SEL).next())
        .unwrap_or_else(|| doc.root_element());

    visible_text(root, &skip)
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

fn extract_metadata(doc: &Html) -> PageMetadata {
    let mut meta = PageMetadata::default();

    for el in doc.select(&META_SEL) {
        let attrs = el.value();
        let content = attrs.attr("content").map(normalize_ws).unwrap_or_default();
        if content.is_empty() {
            continue;
        }
        let key = attrs
            .attr("name")
            .or_else(|| attrs.attr("property"))
            .unwrap_or("")
            .to_ascii_lowercase();

        match key.as_str() {
            "description" if meta.description.is_empty() => meta.description = content,
            "keywords" if meta.keywords.is_empty() => {
                meta.keywords = content
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect();
            }
            "og:title" if meta.og_title.is_empty() => meta.og_title = content,
            "og:description" if meta.og_description.is_empty() => meta.og_description = content,
            _ => {}
        }
    }

    meta
}

fn extract_title(doc: &Html, meta: &PageMetadata) -> String {
    let from_tag = |sel: &Selector| {
        doc.select(sel)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
    };

    from_tag(&TITLE_SEL)
        .or_else(|| from_tag(&H1_SEL))
        .unwrap_or_else(|| meta.og_title.clone())
}

// ---------------------------------------------------------------------------
// Links, social, contact
// ---------------------------------------------------------------------------

/// An `<a href>` resolved against the base URL.
struct Anchor {
    raw: String,
    resolved: Option<Url>,
    text: String,
}

fn resolved_anchors(doc: &Html, base: &Url) -> Vec<Anchor> {
    doc.select(&ANCHOR_SEL)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                return None;
            }
            let resolved = base.join(href).ok().map(|mut u| {
                u.set_fragment(None);
                u
            });
            Some(Anchor {
                raw: href.to_string(),
                resolved,
                text: element_text(el),
            })
        })
        .collect()
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn extract_social_links(anchors: &[Anchor]) -> SocialLinks {
    let mut social = SocialLinks::new();

    for url in anchors.iter().filter_map(|a| a.resolved.as_ref()) {
        if !is_web(url) {
            continue;
        }
        let Some(host) = url.host_str() else {
            continue;
        };
        let host = host.to_ascii_lowercase();
        for (platform, domains) in SOCIAL_HOSTS {
            if domains.iter().any(|d| host_matches(&host, d)) {
                social
                    .entry((*platform).to_string())
                    .or_insert_with(|| url.to_string());
            }
        }
    }

    social
}

fn extract_contact_info(anchors: &[Anchor], full_text: &str) -> ContactInfo {
    let mut contact = ContactInfo::default();

    for anchor in anchors {
        let lower = anchor.raw.to_ascii_lowercase();
        if let Some(addr) = lower.strip_prefix("mailto:") {
            if contact.email.is_none() {
                let addr = addr.split('?').next().unwrap_or("").trim();
                if EMAIL_RE.is_match(addr) {
                    contact.email = Some(addr.to_string());
                }
            }
            continue;
        }
        let Some(url) = anchor.resolved.as_ref().filter(|u| is_web(u)) else {
            continue;
        };
        if contact.contact_form_url.is_none() && lower.contains("contact") {
            contact.contact_form_url = Some(url.to_string());
        }
        if contact.support_url.is_none() && (lower.contains("support") || lower.contains("help"))
        {
            contact.support_url = Some(url.to_string());
        }
    }

    if contact.email.is_none() {
        contact.email = EMAIL_RE.find(full_text).map(|m| m.as_str().to_string());
    }
    contact.phone = PHONE_RE
        .find(full_text)
        .map(|m| m.as_str().trim().to_string());

    contact
}

fn collect_links(anchors: &[Anchor], max: usize) -> Vec<PageLink> {
    let mut seen = HashSet::new();
    anchors
        .iter()
        .filter_map(|a| a.resolved.as_ref().filter(|u| is_web(u)).map(|u| (u, a)))
        .filter(|(u, _)| seen.insert(u.to_string()))
        .take(max)
        .map(|(u, a)| PageLink {
            href: u.to_string(),
            text: a.text.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pricing / features
// ---------------------------------------------------------------------------

fn looks_like_pricing(text: &str) -> bool {
    if text.contains(['$', '€', '£']) {
        return true;
    }
    let lower = text.to_lowercase();
    lower.contains("pricing") || lower.contains("price")
}

fn extract_pricing_mentions(doc: &Html, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(&PRICING_SEL)
        .map(element_text)
        .filter(|t| !t.is_empty() && t.chars().count() < MAX_PRICING_CHARS)
        .filter(|t| looks_like_pricing(t))
        .filter(|t| seen.insert(t.clone()))
        .take(max)
        .collect()
}

fn looks_like_feature(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("feature") || lower.contains("function") || lower.contains("capabilit")
}

fn extract_feature_mentions(doc: &Html, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(&FEATURE_SEL)
        .map(element_text)
        .filter(|t| FEATURE_CHARS.contains(&t.chars().count()))
        .filter(|t| looks_like_feature(t))
        .filter(|t| seen.insert(t.clone()))
        .take(max)
        .collect()
}

// ---------------------------------------------------------------------------
// Logo
// ---------------------------------------------------------------------------

fn extract_logo_url(doc: &Html, base: &Url) -> Option<String> {
    let from_imgs = LOGO_IMG_SELS
        .iter()
        .find_map(|sel| doc.select(sel).find_map(|el| el.value().attr("src")));
    let from_icons = || {
        ICON_SELS
            .iter()
            .find_map(|sel| doc.select(sel).find_map(|el| el.value().attr("href")))
    };
    let from_meta = || {
        doc.select(&META_SEL).find_map(|el| {
            let attrs = el.value();
            let key = attrs.attr("property").or_else(|| attrs.attr("name"))?;
            matches!(key, "og:image" | "twitter:image")
                .then(|| attrs.attr("content"))
                .flatten()
        })
    };

    let raw = from_imgs.or_else(from_icons).or_else(from_meta)?;
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    base.join(raw).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>PixelForge | AI image generator</title>
  <meta name="description" content="Generate product photos with AI.">
  <meta name="keywords" content="ai, images, , photos">
  <meta property="og:title" content="PixelForge">
  <meta property="og:image" content="/static/og.png">
  <link rel="icon" href="/favicon.ico">
  <script>var tracking = "analytics@tracker.io";</script>
</head>
<body>
  <header><img src="/img/pixelforge-logo.svg" alt="PixelForge"><nav><a href="/pricing">Pricing</a></nav></header>
  <main>
    <h1>Create stunning images</h1>
    <p>Our image feature set turns prompts into photos.</p>
    <ul>
      <li>Batch export feature for teams</li>
      <li>Free plan available</li>
      <li>Pro plan $10/mo</li>
    </ul>
    <style>.hidden { display: none }</style>
  </main>
  <footer>
    <a href="mailto:hello@pixelforge.ai?subject=Hi">Email us</a>
    <a href="/contact">Contact</a>
    <a href="https://help.pixelforge.ai/docs">Help center</a>
    <a href="https://twitter.com/pixelforge">Twitter</a>
    <a href="https://x.com/other">X</a>
    <a href="https://github.com/pixelforge">GitHub</a>
    <a href="/partners/affiliate">Affiliate program</a>
    <p>Call +1 415-555-0134</p>
  </footer>
</body>
</html>"#;

    fn base() -> Url {
        Url::parse("https://pixelforge.ai/").unwrap()
    }

    fn signals() -> PageSignals {
        extract_page(TOOL_PAGE, &base(), &ExtractLimits::default())
    }

    #[test]
    fn extracts_title_and_metadata() {
        let s = signals();
        assert_eq!(s.title, "PixelForge | AI image generator");
        assert_eq!(s.description, "Generate product photos with AI.");
        assert_eq!(s.metadata.keywords, vec!["ai", "images", "photos"]);
        assert_eq!(s.metadata.og_title, "PixelForge");
    }

    #[test]
    fn content_comes_from_main_without_chrome() {
        let s = signals();
        assert!(s.content.contains("Create stunning images"));
        assert!(s.content.contains("Free plan available"));
        assert!(!s.content.contains("display: none"));
        assert!(!s.content.contains("Contact"));
        assert!(!s.content.contains("tracking"));
    }

    #[test]
    fn content_falls_back_to_body() {
        let html = "<html><body><nav>Menu</nav><div>Plain body text</div></body></html>";
        let s = extract_page(html, &base(), &ExtractLimits::default());
        assert_eq!(s.content, "Plain body text");
    }

    #[test]
    fn social_links_first_match_wins() {
        let s = signals();
        assert_eq!(
            s.social_links.get("twitter").map(String::as_str),
            Some("https://twitter.com/pixelforge")
        );
        assert_eq!(
            s.social_links.get("github").map(String::as_str),
            Some("https://github.com/pixelforge")
        );
        assert!(!s.social_links.contains_key("linkedin"));
    }

    #[test]
    fn contact_info_resolved() {
        let s = signals();
        let c = &s.contact_info;
        assert_eq!(c.email.as_deref(), Some("hello@pixelforge.ai"));
        assert_eq!(
            c.contact_form_url.as_deref(),
            Some("https://pixelforge.ai/contact")
        );
        assert_eq!(
            c.support_url.as_deref(),
            Some("https://help.pixelforge.ai/docs")
        );
        assert_eq!(c.phone.as_deref(), Some("+1 415-555-0134"));
    }

    #[test]
    fn email_found_in_text_but_not_in_scripts() {
        let html = r#"<html><head><script>x = "bot@tracker.io"</script></head>
            <body><p>Write to team@example.org today</p></body></html>"#;
        let s = extract_page(html, &base(), &ExtractLimits::default());
        assert_eq!(s.contact_info.email.as_deref(), Some("team@example.org"));
    }

    #[test]
    fn pricing_and_feature_mentions() {
        let s = signals();
        assert!(s.pricing.contains(&"Pro plan $10/mo".to_string()));
        assert!(s.pricing.contains(&"Pricing".to_string()));
        assert!(s.features.contains(&"Batch export feature for teams".to_string()));
        // Deduplicated
        let unique: HashSet<_> = s.pricing.iter().collect();
        assert_eq!(unique.len(), s.pricing.len());
    }

    #[test]
    fn mention_limits_apply() {
        let items: String = (0..30)
            .map(|i| format!("<li>Plan {i} costs ${i}</li>"))
            .collect();
        let html = format!("<html><body><ul>{items}</ul></body></html>");
        let limits = ExtractLimits {
            max_pricing: 3,
            max_features: 2,
            max_links: 5,
        };
        let s = extract_page(&html, &base(), &limits);
        assert_eq!(s.pricing.len(), 3);
    }

    #[test]
    fn logo_prefers_logo_images_and_resolves() {
        let s = signals();
        assert_eq!(
            s.logo_url.as_deref(),
            Some("https://pixelforge.ai/img/pixelforge-logo.svg")
        );

        let html = r#"<html><head><meta property="og:image" content="https://cdn.example.com/og.png"></head><body></body></html>"#;
        let s = extract_page(html, &base(), &ExtractLimits::default());
        assert_eq!(s.logo_url.as_deref(), Some("https://cdn.example.com/og.png"));
    }

    #[test]
    fn links_are_absolute_and_unique() {
        let s = signals();
        assert!(
            s.links
                .iter()
                .any(|l| l.href == "https://pixelforge.ai/partners/affiliate"
                    && l.text == "Affiliate program")
        );
        assert!(s.links.iter().all(|l| l.href.starts_with("http")));
        assert!(!s.links.iter().any(|l| l.href.starts_with("mailto:")));
    }
}
