//! Text helpers shared by the analyzers: slugs, summaries, SEO templates.

use url::Url;

use toolscout_shared::{PricingDetails, PricingModel, ScrapedPage};

/// Maximum length of a meta title before it is replaced by the template.
pub const META_TITLE_MAX: usize = 60;

/// Maximum length of a meta description before it is replaced by the template.
pub const META_DESCRIPTION_MAX: usize = 160;

/// Turn a tool name into a URL slug (`"Pixel Forge 2!"` → `"pixel-forge-2"`).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Slug for a tool: its name, else the page host, else a content-hash prefix.
pub fn tool_slug(name: &str, page: &ScrapedPage) -> String {
    let slug = slugify(name);
    if !slug.is_empty() {
        return slug;
    }
    let from_host = host_label(&page.final_url)
        .or_else(|| host_label(&page.url))
        .map(|label| slugify(&label))
        .unwrap_or_default();
    if !from_host.is_empty() {
        return from_host;
    }
    format!("tool-{}", truncate_chars(&page.content_hash, 12))
}

/// `https://www.example.com/x` → `"Example"`.
pub fn host_label(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let label = match labels.len() {
        0 => return None,
        1 => labels[0],
        n => labels[n - 2],
    };
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// One-paragraph pricing summary for catalogue pages.
pub fn pricing_summary(pricing: &PricingDetails) -> String {
    let mut parts = vec![format!("{} pricing model.", pricing.model.label())];

    if pricing.free_tier {
        parts.push("Free tier available.".into());
    }
    if pricing.paid_plans {
        let first_paid = pricing
            .plans
            .iter()
            .map(|p| p.price.trim())
            .find(|p| !p.is_empty() && !p.eq_ignore_ascii_case("free"));
        if let Some(price) = first_paid {
            parts.push(format!("Paid plans start from {price}."));
        }
    }
    if pricing.enterprise_available {
        parts.push("Enterprise plans available.".into());
    }

    parts.join(" ")
}

/// Templated HTML description used when no usable AI description exists.
/// Name, category, and features are escaped.
pub fn seo_description(
    name: &str,
    category: &str,
    features: &[String],
    model: PricingModel,
) -> String {
    let name = escape_html(name);
    let category = escape_html(&category.to_lowercase());
    let feature_items: String = features
        .iter()
        .take(5)
        .map(|f| format!("<li>{}</li>\n", escape_html(f)))
        .collect();

    format!(
        "<h2>What is {name}?</h2>
<p><strong>{name}</strong> is an AI-powered {category} tool for professionals and creators. \
It applies modern machine learning to everyday {category} work so teams get results faster \
and with less manual effort.</p>

<h3>Key Features</h3>
<ul>
{feature_items}<li>AI models tuned for {category}</li>
<li>Interface usable without technical training</li>
<li>Fast turnaround on every request</li>
</ul>

<h3>Use Cases</h3>
<p>{name} suits content creators, marketing teams, small businesses and individual \
professionals who want to streamline their {category} workflow, from first experiments to \
production use.</p>

<h3>Who Should Use {name}?</h3>
<p>Beginners get a guided way into AI-assisted {category}; experienced users get the speed \
and consistency needed to scale their output.</p>

<h3>Pricing</h3>
<p>{name} follows a {model} pricing model. Check the official website for current plans \
and limits.</p>",
        model = model.label().to_lowercase(),
    )
}

/// `"<name> - AI <category> Tool - <site>"`.
pub fn fallback_meta_title(name: &str, category: &str, site_name: &str) -> String {
    format!("{name} - AI {category} Tool - {site_name}")
}

/// Templated meta description, capped at [`META_DESCRIPTION_MAX`] characters.
pub fn fallback_meta_description(name: &str, category: &str) -> String {
    let text = format!(
        "Discover {name}, the AI {} tool that speeds up your workflow with smart features. Try it free today!",
        category.to_lowercase()
    );
    truncate_chars(&text, META_DESCRIPTION_MAX).to_string()
}
