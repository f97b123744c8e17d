//! Affiliate program detection.

use toolscout_shared::{AffiliateInfo, ScrapedPage};

const AFFILIATE_KEYWORDS: &[&str] = &[
    "affiliate",
    "referral",
    "partner program",
    "partners program",
    "commission",
];

fn mentions_affiliate(text: &str) -> bool {
    let lower = text.to_lowercase();
    AFFILIATE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Look for an affiliate or referral program in the page content and links.
pub fn analyze_affiliate(page: &ScrapedPage) -> AffiliateInfo {
    let program_url = page
        .links
        .iter()
        .find(|link| mentions_affiliate(&link.href) || mentions_affiliate(&link.text))
        .map(|link| link.href.clone());
    let in_content = mentions_affiliate(&page.content);

    let notes = match (&program_url, in_content) {
        (Some(url), _) => format!("Affiliate program found at {url}"),
        (None, true) => "Affiliate or referral program mentioned on the page".into(),
        (None, false) => "No affiliate program found".into(),
    };

    AffiliateInfo {
        has_affiliate_program: program_url.is_some() || in_content,
        program_url,
        contact_email: page.contact_info.email.clone(),
        contact_form: page.contact_info.contact_form_url.clone(),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_page, sample_page};
    use toolscout_shared::PageLink;

    #[test]
    fn program_link_wins() {
        let info = analyze_affiliate(&sample_page());
        assert!(info.has_affiliate_program);
        assert_eq!(
            info.program_url.as_deref(),
            Some("https://pixelforge.ai/affiliates")
        );
        assert_eq!(info.contact_email.as_deref(), Some("hello@pixelforge.ai"));
        assert_eq!(
            info.contact_form.as_deref(),
            Some("https://pixelforge.ai/contact")
        );
        assert_eq!(
            info.notes,
            "Affiliate program found at https://pixelforge.ai/affiliates"
        );
    }

    #[test]
    fn content_mention_without_link() {
        let mut page = blank_page();
        page.content = "Refer a friend with our Referral rewards".into();
        let info = analyze_affiliate(&page);
        assert!(info.has_affiliate_program);
        assert!(info.program_url.is_none());
        assert_eq!(info.notes, "Affiliate or referral program mentioned on the page");
    }

    #[test]
    fn link_text_is_checked() {
        let mut page = blank_page();
        page.links.push(PageLink {
            href: "https://example.com/earn".into(),
            text: "Partner Program".into(),
        });
        let info = analyze_affiliate(&page);
        assert_eq!(info.program_url.as_deref(), Some("https://example.com/earn"));
    }

    #[test]
    fn nothing_found() {
        let info = analyze_affiliate(&blank_page());
        assert!(!info.has_affiliate_program);
        assert!(info.program_url.is_none());
        assert!(info.contact_email.is_none());
        assert_eq!(info.notes, "No affiliate program found");
    }
}
