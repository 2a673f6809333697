// src/crawling/url_generator.rs
//! Search-page URLs for every supported job board.

use crate::domain::SearchQuery;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

const XING_SEARCH: &str = "https://www.xing.com/jobs/search";
const STEPSTONE_SEARCH: &str = "https://www.stepstone.de/jobs";
const LINKEDIN_SEARCH: &str = "https://www.linkedin.com/jobs/search/";
const ACCSO_SEARCH: &str = "https://accso.de/dabei-sein/jobs";

const STEPSTONE_RADIUS_KM: &str = "30";
const STEPSTONE_ORIGIN: &str = "Resultlist_top-search";

const ACCSO_DEFAULT_LOCATION_ID: &str = "2076";
const ACCSO_LOCATION_IDS: [(&str, &str); 2] = [("darmstadt", "2076"), ("frankfurt", "2074")];

/// Unreserved characters survive slug encoding; everything else is escaped.
const SLUG_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build one search URL per site, in the fixed order XING, StepStone,
/// LinkedIn, Accso. Never fails: empty fields degrade to shorter URLs or
/// default ids.
pub fn build_search_urls(query: &SearchQuery) -> Vec<String> {
    let keywords = query.joined_keywords();
    let location = query.location.trim();

    vec![
        build_url(
            XING_SEARCH,
            &[("keywords", keywords.as_str()), ("location", location)],
        ),
        build_url(
            &stepstone_path(&keywords, location),
            &[
                ("radius", STEPSTONE_RADIUS_KM),
                ("searchOrigin", STEPSTONE_ORIGIN),
            ],
        ),
        build_url(
            LINKEDIN_SEARCH,
            &[("keywords", keywords.as_str()), ("location", location)],
        ),
        build_url(
            ACCSO_SEARCH,
            &[("jobs-overview-filter__locations", accso_location_id(location))],
        ),
    ]
}

/// Append form-encoded parameters, omitting empty values entirely
fn build_url(base: &str, params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(_, value)| !value.is_empty()) {
        serializer.append_pair(key, value);
        any = true;
    }
    if !any {
        return base.to_string();
    }
    format!("{}?{}", base, serializer.finish())
}

/// `/jobs/<keywords>/in-<location>`, dropping whichever segment is empty
fn stepstone_path(keywords: &str, location: &str) -> String {
    let mut path = STEPSTONE_SEARCH.to_string();
    let keyword_slug = slugify(keywords);
    let location_slug = slugify(location);
    if !keyword_slug.is_empty() {
        path.push('/');
        path.push_str(&keyword_slug);
    }
    if !location_slug.is_empty() {
        path.push_str("/in-");
        path.push_str(&location_slug);
    }
    path
}

/// Lowercase, join whitespace-separated words with `-`, percent-encode the rest
pub fn slugify(value: &str) -> String {
    let raw = value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    utf8_percent_encode(&raw, SLUG_ENCODE_SET).to_string()
}

/// Numeric locations pass through; known city names map to their id;
/// anything else gets the default id.
pub fn accso_location_id(location: &str) -> &str {
    let location = location.trim();
    if !location.is_empty() && location.chars().all(|c| c.is_ascii_digit()) {
        return location;
    }
    let lowered = location.to_lowercase();
    ACCSO_LOCATION_IDS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, id)| *id)
        .unwrap_or(ACCSO_DEFAULT_LOCATION_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawling::{detect_site, SiteKind};

    fn query(keywords: &[&str], location: &str) -> SearchQuery {
        SearchQuery::new(keywords.iter().copied(), location)
    }

    #[test]
    fn test_build_search_urls_basic() {
        let urls = build_search_urls(&query(&["python"], "berlin"));
        assert_eq!(
            urls,
            vec![
                "https://www.xing.com/jobs/search?keywords=python&location=berlin",
                "https://www.stepstone.de/jobs/python/in-berlin?radius=30&searchOrigin=Resultlist_top-search",
                "https://www.linkedin.com/jobs/search/?keywords=python&location=berlin",
                "https://accso.de/dabei-sein/jobs?jobs-overview-filter__locations=2076",
            ]
        );
    }

    #[test]
    fn test_urls_follow_fixed_site_order() {
        let kinds: Vec<_> = build_search_urls(&query(&["rust"], "darmstadt"))
            .iter()
            .map(|url| detect_site(url).map(|p| p.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(SiteKind::Xing),
                Some(SiteKind::Stepstone),
                Some(SiteKind::Linkedin),
                Some(SiteKind::Accso),
            ]
        );
    }

    #[test]
    fn test_special_characters_are_encoded() {
        let q = query(&["c++", "data science"], "New York");
        let urls = build_search_urls(&q);
        assert!(urls.iter().all(|url| !url.contains(' ')));
        assert_eq!(
            urls[0],
            "https://www.xing.com/jobs/search?keywords=c%2B%2B+data+science&location=New+York"
        );
        assert!(urls[1].starts_with("https://www.stepstone.de/jobs/c%2B%2B-data-science/in-new-york?"));
        assert_eq!(urls, build_search_urls(&q));
    }

    #[test]
    fn test_empty_keywords_still_yield_one_url_per_site() {
        let urls = build_search_urls(&query(&[], "berlin"));
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[0], "https://www.xing.com/jobs/search?location=berlin");
        assert_eq!(
            urls[1],
            "https://www.stepstone.de/jobs/in-berlin?radius=30&searchOrigin=Resultlist_top-search"
        );
    }

    #[test]
    fn test_empty_query_omits_parameters() {
        let urls = build_search_urls(&query(&[], ""));
        assert_eq!(urls[0], "https://www.xing.com/jobs/search");
        assert_eq!(urls[2], "https://www.linkedin.com/jobs/search/");
        assert!(urls
            .iter()
            .all(|url| !url.ends_with('=') && !url.contains("=&")));
    }

    #[test]
    fn test_accso_location_ids() {
        assert_eq!(accso_location_id("darmstadt"), "2076");
        assert_eq!(accso_location_id("Frankfurt"), "2074");
        assert_eq!(accso_location_id("12345"), "12345");
        assert_eq!(accso_location_id("Hamburg"), "2076");
        assert_eq!(accso_location_id(""), "2076");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Senior   Rust  Engineer "), "senior-rust-engineer");
        assert_eq!(slugify("München"), "m%C3%BCnchen");
        assert_eq!(slugify(""), "");
    }
}
