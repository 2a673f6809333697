// src/parsing/link_extractor.rs
//! Detail-page link discovery on search-result pages.

use crate::crawling::{SiteKind, SiteProfile};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Absolute detail-page URLs in first-seen order, exact duplicates removed.
/// Anchors that fail the site's rule are skipped silently.
pub fn extract_detail_urls(html: &str, base_url: &str, site: Option<&SiteProfile>) -> Vec<String> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let resolved = match &base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Ok(full) = resolved else {
            continue;
        };
        if is_job_detail_url(&full, site) {
            let full = String::from(full);
            if seen.insert(full.clone()) {
                urls.push(full);
            }
        }
    }

    urls
}

/// Host + path rule per site; unknown sites accept any `/jobs/` path.
pub fn is_job_detail_url(url: &Url, site: Option<&SiteProfile>) -> bool {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let path = url.path().to_lowercase();

    match site.map(|profile| profile.kind) {
        Some(SiteKind::Linkedin) => host.contains("linkedin.com") && path.contains("/jobs/view/"),
        Some(SiteKind::Stepstone) => host.contains("stepstone.de") && path.contains("/jobs/"),
        Some(SiteKind::Xing) => host.contains("xing.com") && path.contains("/jobs/"),
        Some(SiteKind::Accso) => host.contains("accso.de") && path.contains("/dabei-sein/jobs/"),
        // TODO: also matches category and search pages on unknown hosts; tighten once false positives are sampled
        None => path.contains("/jobs/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawling::detect_site;

    #[test]
    fn test_linkedin_relative_links_resolved_and_deduped() {
        let base = "https://www.linkedin.com/jobs/search/?keywords=python";
        let html = r#"
            <a href="/jobs/view/123">Dev</a>
            <a href="/jobs/view/123">Dev again</a>
            <a href="https://www.linkedin.com/jobs/view/456?trk=x">Other</a>
            <a href="/jobs/search/?page=2">Next</a>
            <a href="https://example.com/jobs/view/789">Foreign</a>
            <a>no href</a>
            <a href="   ">blank</a>
        "#;
        let urls = extract_detail_urls(html, base, detect_site(base));
        assert_eq!(
            urls,
            vec![
                "https://www.linkedin.com/jobs/view/123",
                "https://www.linkedin.com/jobs/view/456?trk=x",
            ]
        );
    }

    #[test]
    fn test_accso_detail_rule() {
        let base = "https://accso.de/dabei-sein/jobs?jobs-overview-filter__locations=2076";
        let html = r#"
            <a href="/dabei-sein/jobs/senior-dev">Senior</a>
            <a href="/dabei-sein/">Overview</a>
        "#;
        let urls = extract_detail_urls(html, base, detect_site(base));
        assert_eq!(urls, vec!["https://accso.de/dabei-sein/jobs/senior-dev"]);
    }

    #[test]
    fn test_unknown_site_falls_back_to_jobs_segment() {
        let base = "https://careers.example.com/search";
        let html = r#"
            <a href="/jobs/42">Job</a>
            <a href="/about">About</a>
            <a href="mailto:hr@example.com">Mail</a>
        "#;
        let urls = extract_detail_urls(html, base, None);
        assert_eq!(urls, vec!["https://careers.example.com/jobs/42"]);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let base = "https://www.xing.com/jobs/search";
        let html = r#"
            <a href="/jobs/berlin-b-2">B</a>
            <a href="/jobs/berlin-a-1">A</a>
            <a href="/jobs/berlin-b-2">B</a>
        "#;
        let urls = extract_detail_urls(html, base, detect_site(base));
        assert_eq!(
            urls,
            vec![
                "https://www.xing.com/jobs/berlin-b-2",
                "https://www.xing.com/jobs/berlin-a-1",
            ]
        );
    }
}
