// src/parsing/html_extractors.rs
//! The four description extraction strategies.

use super::json_search::{find_by_type, find_object};
use crate::error::ExtractionError;
use crate::utils::normalize_whitespace;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;

pub const JSON_LD: &str = "json-ld";
pub const EMBEDDED_JSON: &str = "embedded-json";
pub const SELECTOR: &str = "selector";
pub const KEYWORDS: &str = "keywords";

pub const LINKEDIN_JOB_POSTING_TYPE: &str = "com.linkedin.voyager.dash.jobs.JobPosting";

/// Containers considered by keyword scoring
const BLOCK_TAGS: &str = "main, section, article, div";

/// Visible text of an element, whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Strip tags from an HTML fragment and collapse whitespace
pub fn strip_html(value: &str) -> String {
    let fragment = Html::parse_fragment(value);
    normalize_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}

/// The schema.org `JobPosting` object from the page's JSON-LD blocks.
pub fn extract_json_ld_posting(html: &str) -> Option<Value> {
    let scripts = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    let document = Html::parse_document(html);

    document.select(&scripts).find_map(|script| {
        let text = script.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let payload: Value = serde_json::from_str(text).ok()?;
        find_by_type(&payload, "@type", "JobPosting").cloned()
    })
}

/// Description from JSON-LD, tags stripped and whitespace collapsed
pub fn extract_description_json_ld(html: &str) -> Result<String, ExtractionError> {
    let posting = extract_json_ld_posting(html)
        .ok_or_else(|| ExtractionError::new(JSON_LD, "no JobPosting JSON-LD found"))?;
    json_ld_description(&posting)
}

pub fn json_ld_description(posting: &Value) -> Result<String, ExtractionError> {
    let description = posting
        .get("description")
        .and_then(Value::as_str)
        .map(strip_html)
        .unwrap_or_default();
    if description.is_empty() {
        return Err(ExtractionError::new(JSON_LD, "JobPosting has no description"));
    }
    Ok(description)
}

/// Text of a `<code>` element including comment nodes, HTML-unescaped.
/// Client-rendered payloads are often shipped inside `<!-- -->`.
fn code_payload_text(code: ElementRef) -> String {
    let mut raw = String::new();
    for node in code.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Comment(comment) => raw.push_str(comment),
            _ => {}
        }
    }
    html_escape::decode_html_entities(raw.trim()).into_owned()
}

/// Every `<code>` block that parses as a JSON object
pub fn load_code_payloads(html: &str) -> Vec<Value> {
    let Ok(codes) = Selector::parse("code") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&codes)
        .filter_map(|code| {
            let text = code_payload_text(code);
            if !text.starts_with('{') {
                return None;
            }
            serde_json::from_str(&text).ok()
        })
        .collect()
}

/// Locate the vendor job entity: the `included` collection first, then
/// the whole payload.
pub fn find_embedded_job_posting(payload: &Value) -> Option<&Value> {
    let is_posting = |map: &serde_json::Map<String, Value>| {
        map.get("$type").and_then(Value::as_str) == Some(LINKEDIN_JOB_POSTING_TYPE)
    };
    payload
        .get("included")
        .and_then(|included| find_object(included, is_posting))
        .or_else(|| find_object(payload, is_posting))
}

/// The embedded job entity of the first payload carrying a non-empty
/// `description.text`
pub fn extract_embedded_job_posting(html: &str) -> Result<Value, ExtractionError> {
    load_code_payloads(html)
        .iter()
        .filter_map(find_embedded_job_posting)
        .find(|posting| {
            posting
                .pointer("/description/text")
                .and_then(Value::as_str)
                .is_some_and(|text| !text.trim().is_empty())
        })
        .cloned()
        .ok_or_else(|| {
            ExtractionError::new(
                EMBEDDED_JSON,
                "no JSON payload with a JobPosting entity found in <code> tags",
            )
        })
}

pub fn extract_description_embedded_json(html: &str) -> Result<String, ExtractionError> {
    let posting = extract_embedded_job_posting(html)?;
    Ok(posting
        .pointer("/description/text")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default())
}

/// Text of the first element matching a caller-supplied selector
pub fn extract_text_by_selector(html: &str, css: &str) -> Result<String, ExtractionError> {
    let parsed = Selector::parse(css)
        .map_err(|e| ExtractionError::new(SELECTOR, format!("invalid selector `{}`: {}", css, e)))?;
    let document = Html::parse_document(html);
    document
        .select(&parsed)
        .next()
        .map(|element| element_text(&element))
        .ok_or_else(|| ExtractionError::new(SELECTOR, format!("no element found for `{}`", css)))
}

/// Number of distinct keywords contained in `text` (case-insensitive)
pub fn keyword_score(text: &str, keywords: &[String]) -> usize {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| lowered.contains(keyword.as_str()))
        .count()
}

/// Text of the block container matching the most keywords. Ties go to the
/// first block in document order.
pub fn extract_description_by_keywords(
    html: &str,
    keywords: &[String],
) -> Result<String, ExtractionError> {
    let mut normalized: Vec<String> = keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect();
    normalized.sort_unstable();
    normalized.dedup();
    if normalized.is_empty() {
        return Err(ExtractionError::new(
            KEYWORDS,
            "keywords are required for block scoring",
        ));
    }

    let blocks = Selector::parse(BLOCK_TAGS)
        .map_err(|e| ExtractionError::new(KEYWORDS, e.to_string()))?;
    let document = Html::parse_document(html);

    let mut best_text = String::new();
    let mut best_score = 0;
    for block in document.select(&blocks) {
        let text = element_text(&block);
        if text.is_empty() {
            continue;
        }
        let score = keyword_score(&text, &normalized);
        if score > best_score {
            best_score = score;
            best_text = text;
        }
    }

    if best_score == 0 {
        return Err(ExtractionError::new(
            KEYWORDS,
            "no content matched the provided keywords",
        ));
    }
    Ok(best_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_json_ld_strips_markup() {
        let html = r#"<html><head><script type="application/ld+json">{"@type":"JobPosting","description":"<p>Build <b>APIs</b></p>"}</script></head></html>"#;
        assert_eq!(extract_description_json_ld(html).unwrap(), "Build APIs");
    }

    #[test]
    fn test_json_ld_skips_invalid_blocks() {
        let html = r#"
            <script type="application/ld+json">{ not json</script>
            <script type="application/ld+json">{"@type":"Organization","name":"Acme"}</script>
            <script type="application/ld+json">[{"@graph":[{"@type":"JobPosting","description":"Ship   Rust\n services"}]}]</script>
        "#;
        assert_eq!(extract_description_json_ld(html).unwrap(), "Ship Rust services");
    }

    #[test]
    fn test_json_ld_missing_is_error() {
        let html = "<div>Python developer role in Berlin</div>";
        let err = extract_description_json_ld(html).unwrap_err();
        assert_eq!(err.strategy, JSON_LD);
    }

    #[test]
    fn test_embedded_json_in_comment() {
        let html = r#"<html><body>
            <code id="a"><!--{&quot;data&quot;:{}}--></code>
            <code id="b"><!--{&quot;included&quot;:[{&quot;$type&quot;:&quot;com.linkedin.voyager.dash.jobs.JobPosting&quot;,&quot;title&quot;:&quot;Rust Dev&quot;,&quot;description&quot;:{&quot;text&quot;:&quot;Write Rust&quot;}}]}--></code>
        </body></html>"#;
        assert_eq!(extract_description_embedded_json(html).unwrap(), "Write Rust");
        let posting = extract_embedded_job_posting(html).unwrap();
        assert_eq!(posting["title"], "Rust Dev");
    }

    #[test]
    fn test_embedded_json_prefers_included() {
        let payload = serde_json::json!({
            "data": {"$type": LINKEDIN_JOB_POSTING_TYPE, "description": {"text": "outer"}},
            "included": [{"$type": LINKEDIN_JOB_POSTING_TYPE, "description": {"text": "inner"}}]
        });
        let found = find_embedded_job_posting(&payload).unwrap();
        assert_eq!(found["description"]["text"], "inner");
    }

    #[test]
    fn test_embedded_json_missing_is_error() {
        let html = "<code>not json</code><code>{\"a\":1}</code>";
        let err = extract_description_embedded_json(html).unwrap_err();
        assert_eq!(err.strategy, EMBEDDED_JSON);
    }

    #[test]
    fn test_selector_text() {
        let html = "<div class='step-stone-job-ad'>\n  Role   details <span>here</span> </div>";
        assert_eq!(
            extract_text_by_selector(html, ".step-stone-job-ad").unwrap(),
            "Role details here"
        );
        assert!(extract_text_by_selector(html, "#missing").is_err());
        assert!(extract_text_by_selector(html, "[[bad").is_err());
    }

    #[test]
    fn test_keyword_scoring_picks_best_block() {
        let html = r#"<body>
            <div id="nav">Home Jobs</div>
            <section>Python developer role</section>
            <article>Python and Rust developer role</article>
        </body>"#;
        assert_eq!(
            extract_description_by_keywords(html, &kws(&["python"])).unwrap(),
            "Python developer role"
        );
        assert_eq!(
            extract_description_by_keywords(html, &kws(&["Python", "rust"])).unwrap(),
            "Python and Rust developer role"
        );
    }

    #[test]
    fn test_keyword_scoring_failures() {
        let html = "<div>Nothing relevant</div>";
        assert!(extract_description_by_keywords(html, &kws(&[])).is_err());
        assert!(extract_description_by_keywords(html, &kws(&["  "])).is_err());
        assert!(extract_description_by_keywords(html, &kws(&["python"])).is_err());
    }

    #[test]
    fn test_no_json_ld_but_keywords_match() {
        let html = "<html><body><main><div>Python developer role</div></main></body></html>";
        assert!(extract_description_json_ld(html).is_err());
        assert_eq!(
            extract_description_by_keywords(html, &kws(&["python"])).unwrap(),
            "Python developer role"
        );
    }
}
