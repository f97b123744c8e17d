//! Deterministic pricing analysis.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use toolscout_shared::{BillingCycle, PricingDetails, PricingModel, PricingPlan, ScrapedPage};

/// Maximum plans extracted from pricing mentions.
const MAX_PLANS: usize = 6;

/// Plan names longer than this are sentences, not names.
const MAX_PLAN_NAME_CHARS: usize = 40;

const FREE_PHRASES: &[&str] = &[
    "free plan",
    "free tier",
    "free forever",
    "free trial",
    "freemium",
    "free version",
    "for free",
    "try it free",
    "get started free",
    "free to use",
];

const PAID_PHRASES: &[&str] = &[
    "subscription",
    "premium",
    "per month",
    "/mo",
    "/month",
    "monthly",
    "yearly",
    "annually",
    "paid plan",
    "pro plan",
    "upgrade",
];

const RECURRING_PHRASES: &[&str] = &[
    "subscription",
    "per month",
    "/mo",
    "/month",
    "monthly",
    "per year",
    "/year",
    "/yr",
    "yearly",
    "annually",
];

const USAGE_PHRASES: &[&str] = &[
    "per credit",
    "pay as you go",
    "pay-as-you-go",
    "usage-based",
    "usage based",
    "per request",
    "per api call",
    "credits",
];

const SALES_PHRASES: &[&str] = &["contact sales", "contact us", "custom pricing", "talk to sales"];

/// A currency amount with an optional period/unit suffix: `$10/mo`, `10 €`, `£5 per user`,
/// `$1,299/yr`. Grouped thousands are tried before plain amounts.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            [$€£]\s?(?P<a1>
                \d{1,3}(?:,\d{3})+(?:\.\d{1,2})?
              | \d{1,3}(?:\.\d{3})+(?:,\d{1,2})?
              | \d+(?:[.,]\d{1,2})?
            )
          | (?P<a2>
                \d{1,3}(?:,\d{3})+(?:\.\d{1,2})?
              | \d{1,3}(?:\.\d{3})+(?:,\d{1,2})?
              | \d+(?:[.,]\d{1,2})?
            )\s?(?:[€£$]|(?:usd|eur|gbp)\b)
        )
        (?P<suffix>\s?(?:/|per\s+)\s?(?:month|mo|year|yr|annum|user|seat|credit|request)s?\b)?",
    )
    .expect("valid regex")
});

/// A currency amount found in text.
struct PriceMatch<'a> {
    /// The full match, trimmed (`"$10/mo"`).
    text: &'a str,
    /// Start offset of the match in the searched text.
    start: usize,
    amount: f64,
}

fn price_from(caps: &Captures<'_>) -> Option<f64> {
    let raw = caps.name("a1").or_else(|| caps.name("a2"))?.as_str();
    parse_amount(raw)
}

/// Parse `1,299.50`, `1.299,50`, `10,5` or `10`. A final separator followed by
/// exactly three digits groups thousands; otherwise it marks the decimals.
fn parse_amount(raw: &str) -> Option<f64> {
    let (whole, decimals) = match raw.rfind([',', '.']) {
        Some(i) if raw.len() - i - 1 != 3 => (&raw[..i], &raw[i + 1..]),
        _ => (raw, ""),
    };
    let mut number: String = whole.chars().filter(char::is_ascii_digit).collect();
    if !decimals.is_empty() {
        number.push('.');
        number.push_str(decimals);
    }
    number.parse().ok()
}

fn prices(text: &str) -> impl Iterator<Item = PriceMatch<'_>> {
    PRICE_RE.captures_iter(text).filter_map(|caps| {
        let m = caps.get(0)?;
        Some(PriceMatch {
            text: m.as_str().trim(),
            start: m.start(),
            amount: price_from(&caps)?,
        })
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a page's pricing from its content and pricing mentions.
pub fn analyze_pricing(page: &ScrapedPage) -> PricingDetails {
    let mut text = page.content.to_lowercase();
    for mention in &page.pricing {
        text.push('\n');
        text.push_str(&mention.to_lowercase());
    }

    let amounts: Vec<f64> = prices(&text).map(|p| p.amount).collect();
    let freemium = text.contains("freemium");

    let free_tier = contains_any(&text, FREE_PHRASES) || amounts.iter().any(|a| *a == 0.0);
    let paid_plans =
        freemium || contains_any(&text, PAID_PHRASES) || amounts.iter().any(|a| *a > 0.0);
    let enterprise_available = text.contains("enterprise");
    let contact_sales = contains_any(&text, SALES_PHRASES);

    let model = if free_tier && paid_plans {
        PricingModel::Freemium
    } else if paid_plans && contains_any(&text, USAGE_PHRASES) {
        PricingModel::UsageBased
    } else if paid_plans && contains_any(&text, RECURRING_PHRASES) {
        PricingModel::Subscription
    } else if paid_plans {
        PricingModel::Paid
    } else if enterprise_available && contact_sales {
        PricingModel::Enterprise
    } else if free_tier {
        PricingModel::Free
    } else {
        PricingModel::Unknown
    };

    let plans = extract_plans(&page.pricing);
    let notes = pricing_notes(free_tier, paid_plans, enterprise_available, plans.len());

    PricingDetails {
        model,
        plans,
        free_tier,
        paid_plans,
        enterprise_available,
        notes,
    }
}

/// Turn pricing mentions that carry a price into plans, deduplicated by price.
fn extract_plans(mentions: &[String]) -> Vec<PricingPlan> {
    let mut plans: Vec<PricingPlan> = Vec::new();

    for mention in mentions {
        if plans.len() == MAX_PLANS {
            break;
        }
        let Some(price) = prices(mention).next() else {
            continue;
        };
        if plans.iter().any(|p| p.price == price.text) {
            continue;
        }

        let name = mention[..price.start]
            .trim_matches(|c: char| c.is_whitespace() || ":-–|".contains(c))
            .to_string();
        let name = if name.is_empty() || name.chars().count() > MAX_PLAN_NAME_CHARS {
            format!("Plan {}", plans.len() + 1)
        } else {
            name
        };

        plans.push(PricingPlan {
            name,
            price: price.text.to_string(),
            features: Vec::new(),
            billing: billing_cycle(mention),
        });
    }

    plans
}

fn billing_cycle(mention: &str) -> BillingCycle {
    let lower = mention.to_lowercase();
    if lower.contains("/mo") || lower.contains("month") {
        BillingCycle::Monthly
    } else if lower.contains("/yr") || lower.contains("year") || lower.contains("annual") {
        BillingCycle::Yearly
    } else {
        BillingCycle::OneTime
    }
}

fn pricing_notes(free: bool, paid: bool, enterprise: bool, plans: usize) -> String {
    let mut found = Vec::new();
    if free {
        found.push("free tier");
    }
    if paid {
        found.push("paid plans");
    }
    if enterprise {
        found.push("enterprise offering");
    }
    if found.is_empty() {
        return "No pricing information found on the page".into();
    }
    let mut notes = format!("Detected from page content: {}", found.join(", "));
    if plans > 0 {
        notes.push_str(&format!(" ({plans} priced plan(s) listed)"));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::blank_page;

    fn page(content: &str, pricing: &[&str]) -> ScrapedPage {
        let mut page = blank_page();
        page.content = content.into();
        page.pricing = pricing.iter().map(|s| s.to_string()).collect();
        page
    }

    #[test]
    fn free_plan_and_monthly_price_is_freemium() {
        let details = analyze_pricing(&page(
            "Free plan available\npricing starts at $10/mo",
            &[],
        ));
        assert!(details.free_tier);
        assert!(details.paid_plans);
        assert_eq!(details.model, PricingModel::Freemium);
    }

    #[test]
    fn classification_is_deterministic() {
        let p = page(
            "Pro plan $29/month. Enterprise: contact sales.",
            &["Pro $29/month", "Team $99/month"],
        );
        assert_eq!(analyze_pricing(&p), analyze_pricing(&p));
    }

    #[test]
    fn model_precedence() {
        let cases = [
            ("Start for free, then $5 per credit", PricingModel::Freemium),
            ("Buy 100 credits for $20", PricingModel::UsageBased),
            ("Only $12/month, billed monthly", PricingModel::Subscription),
            ("One-time license 49 €", PricingModel::Paid),
            ("Enterprise only. Contact sales for a quote.", PricingModel::Enterprise),
            ("Completely free to use, no signup", PricingModel::Free),
            ("We build great software", PricingModel::Unknown),
        ];
        for (content, expected) in cases {
            assert_eq!(analyze_pricing(&page(content, &[])).model, expected, "{content}");
        }
    }

    #[test]
    fn zero_price_counts_as_free() {
        let details = analyze_pricing(&page("Hobby $0", &[]));
        assert!(details.free_tier);
        assert!(!details.paid_plans);
        assert_eq!(details.model, PricingModel::Free);
    }

    #[test]
    fn no_signal_is_unknown_without_free_tier() {
        let details = analyze_pricing(&page("", &[]));
        assert_eq!(details.model, PricingModel::Unknown);
        assert!(!details.free_tier);
        assert!(!details.paid_plans);
        assert!(!details.enterprise_available);
        assert_eq!(details.notes, "No pricing information found on the page");
    }

    #[test]
    fn plans_from_mentions() {
        let details = analyze_pricing(&page(
            "",
            &[
                "Pro plan: $10/mo",
                "Pro plan $10/mo",
                "Team - $99 per year",
                "Lifetime deal 199 €",
                "$5",
            ],
        ));
        assert_eq!(details.plans.len(), 4);
        assert_eq!(details.plans[0].name, "Pro plan");
        assert_eq!(details.plans[0].price, "$10/mo");
        assert_eq!(details.plans[0].billing, BillingCycle::Monthly);
        assert_eq!(details.plans[1].name, "Team");
        assert_eq!(details.plans[1].price, "$99 per year");
        assert_eq!(details.plans[1].billing, BillingCycle::Yearly);
        assert_eq!(details.plans[2].price, "199 €");
        assert_eq!(details.plans[2].billing, BillingCycle::OneTime);
        assert_eq!(details.plans[3].name, "Plan 4");

        let details = analyze_pricing(&page("", &["Enterprise $1,299/yr", "Studio 1.499,50 €"]));
        assert_eq!(details.plans[0].name, "Enterprise");
        assert_eq!(details.plans[0].price, "$1,299/yr");
        assert_eq!(details.plans[0].billing, BillingCycle::Yearly);
        assert_eq!(details.plans[1].price, "1.499,50 €");
    }

    #[test]
    fn amounts_parse_grouped_thousands() {
        assert_eq!(parse_amount("1,299"), Some(1299.0));
        assert_eq!(parse_amount("1.299,50"), Some(1299.5));
        assert_eq!(parse_amount("12,345,678.9"), Some(12_345_678.9));
        assert_eq!(parse_amount("10,5"), Some(10.5));
        assert_eq!(parse_amount("9.99"), Some(9.99));
        assert_eq!(parse_amount("0"), Some(0.0));
    }

    #[test]
    fn plans_capped() {
        let mentions: Vec<String> = (1..=10).map(|i| format!("Tier {i} ${i}0")).collect();
        let refs: Vec<&str> = mentions.iter().map(String::as_str).collect();
        assert_eq!(analyze_pricing(&page("", &refs)).plans.len(), MAX_PLANS);
    }

    #[test]
    fn enterprise_flag() {
        let details = analyze_pricing(&page("Pro $20/mo. Enterprise plans available.", &[]));
        assert!(details.enterprise_available);
        assert_eq!(details.model, PricingModel::Subscription);
    }
}
