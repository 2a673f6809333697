// src/crawling/site_registry.rs
//! Static per-site crawl settings, looked up by URL substring.

/// Supported job sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    Accso,
    Xing,
    Stepstone,
    Linkedin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub kind: SiteKind,
    pub name: &'static str,
    pub follow_iframe: bool,
    pub iframe_selector: &'static str,
    pub wait_for_structured_data: bool,
}

pub const DEFAULT_IFRAME_SELECTOR: &str = "iframe";

pub static ACCSO: SiteProfile = SiteProfile {
    kind: SiteKind::Accso,
    name: "accso",
    follow_iframe: true,
    iframe_selector: "iframe#jobFrame",
    wait_for_structured_data: false,
};

pub static XING: SiteProfile = SiteProfile {
    kind: SiteKind::Xing,
    name: "xing",
    follow_iframe: false,
    iframe_selector: DEFAULT_IFRAME_SELECTOR,
    wait_for_structured_data: true,
};

pub static STEPSTONE: SiteProfile = SiteProfile {
    kind: SiteKind::Stepstone,
    name: "stepstone",
    follow_iframe: false,
    iframe_selector: DEFAULT_IFRAME_SELECTOR,
    wait_for_structured_data: true,
};

pub static LINKEDIN: SiteProfile = SiteProfile {
    kind: SiteKind::Linkedin,
    name: "linkedin",
    follow_iframe: false,
    iframe_selector: DEFAULT_IFRAME_SELECTOR,
    wait_for_structured_data: false,
};

/// Matchers evaluated in order; the first hit wins.
static SITE_MATCHERS: [(&str, &SiteProfile); 4] = [
    ("accso", &ACCSO),
    ("xing.com", &XING),
    ("stepstone", &STEPSTONE),
    ("linkedin.com", &LINKEDIN),
];

/// Identify the site profile for a URL.
///
/// `None` means the site is unknown and callers fall back to generic
/// heuristics; it is not an error.
pub fn detect_site(url: &str) -> Option<&'static SiteProfile> {
    if url.is_empty() {
        return None;
    }
    let lowered = url.to_lowercase();
    SITE_MATCHERS
        .iter()
        .find(|(needle, _)| lowered.contains(*needle))
        .map(|(_, profile)| *profile)
}

/// Source label recorded on listings
pub fn source_label(profile: Option<&SiteProfile>) -> &'static str {
    profile.map(|p| p.name).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_sites() {
        let xing = detect_site("https://www.xing.com/jobs/search?keywords=python").unwrap();
        assert_eq!(xing.kind, SiteKind::Xing);
        assert!(xing.wait_for_structured_data);

        let accso = detect_site("https://ACCSO.de/dabei-sein/jobs").unwrap();
        assert!(accso.follow_iframe);
        assert_eq!(accso.iframe_selector, "iframe#jobFrame");

        assert_eq!(
            detect_site("https://www.stepstone.de/jobs/rust").map(|p| p.kind),
            Some(SiteKind::Stepstone)
        );
        assert_eq!(
            detect_site("https://www.linkedin.com/jobs/view/1").map(|p| p.kind),
            Some(SiteKind::Linkedin)
        );
    }

    #[test]
    fn test_detect_unknown_site() {
        assert!(detect_site("https://unknown.example.com").is_none());
        assert!(detect_site("").is_none());
        assert_eq!(source_label(None), "unknown");
    }

    #[test]
    fn test_first_match_wins() {
        // an accso page that mentions linkedin in its query string
        let profile = detect_site("https://accso.de/jobs?ref=linkedin.com").unwrap();
        assert_eq!(profile.kind, SiteKind::Accso);
    }
}
