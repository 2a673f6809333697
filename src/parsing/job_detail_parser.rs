// src/parsing/job_detail_parser.rs
//! Strategy dispatch for job detail pages.
//!
//! The site profile picks the strategy; the engine cannot tell from the HTML
//! whether the choice was right, so a wrong pairing simply fails extraction.

use super::html_extractors::{
    element_text, extract_description_by_keywords, extract_embedded_job_posting,
    extract_json_ld_posting, extract_text_by_selector, json_ld_description, JSON_LD,
};
use crate::crawling::{SiteKind, SiteProfile};
use crate::error::ExtractionError;
use crate::utils::normalize_whitespace;
use scraper::{Html, Selector};
use serde_json::Value;

/// Selector for the job ad inside Accso's embedded frame
pub const ACCSO_JOB_AD_SELECTOR: &str = ".step-stone-job-ad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    JsonLd,
    EmbeddedJson,
    Selector(String),
    Keywords(Vec<String>),
}

impl ExtractionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::JsonLd => "json-ld",
            Self::EmbeddedJson => "embedded-json",
            Self::Selector(_) => "selector",
            Self::Keywords(_) => "keywords",
        }
    }
}

/// Strategy for a detected site; unknown sites get keyword scoring
pub fn strategy_for_site(site: Option<&SiteProfile>, keywords: &[String]) -> ExtractionStrategy {
    match site.map(|profile| profile.kind) {
        Some(SiteKind::Linkedin) => ExtractionStrategy::EmbeddedJson,
        Some(SiteKind::Xing) | Some(SiteKind::Stepstone) => ExtractionStrategy::JsonLd,
        Some(SiteKind::Accso) => ExtractionStrategy::Selector(ACCSO_JOB_AD_SELECTOR.to_string()),
        None => ExtractionStrategy::Keywords(keywords.to_vec()),
    }
}

/// Description plus whatever header fields the page exposed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDetail {
    pub description: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

pub fn parse_job_detail(
    html: &str,
    strategy: &ExtractionStrategy,
) -> Result<JobDetail, ExtractionError> {
    match strategy {
        ExtractionStrategy::JsonLd => {
            let posting = extract_json_ld_posting(html)
                .ok_or_else(|| ExtractionError::new(JSON_LD, "no JobPosting JSON-LD found"))?;
            let description = json_ld_description(&posting)?;
            Ok(JobDetail {
                description,
                title: json_text(posting.get("title")),
                company: json_ld_company(&posting),
                location: json_ld_locality(&posting),
            })
        }
        ExtractionStrategy::EmbeddedJson => {
            let posting = extract_embedded_job_posting(html)?;
            let description = posting
                .pointer("/description/text")
                .and_then(Value::as_str)
                .map(|text| text.trim().to_string())
                .unwrap_or_default();
            Ok(JobDetail {
                description,
                title: json_text(posting.get("title")),
                company: None,
                location: json_text(posting.get("formattedLocation")),
            })
        }
        ExtractionStrategy::Selector(css) => {
            let description = extract_text_by_selector(html, css)?;
            Ok(with_page_header(html, description))
        }
        ExtractionStrategy::Keywords(keywords) => {
            let description = extract_description_by_keywords(html, keywords)?;
            Ok(with_page_header(html, description))
        }
    }
}

fn json_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(normalize_whitespace)
        .filter(|text| !text.is_empty())
}

/// `hiringOrganization` is either a plain name or an Organization object
fn json_ld_company(posting: &Value) -> Option<String> {
    let organization = posting.get("hiringOrganization")?;
    json_text(Some(organization)).or_else(|| json_text(organization.get("name")))
}

/// `jobLocation` may be one Place or a list of them
fn json_ld_locality(posting: &Value) -> Option<String> {
    let place = match posting.get("jobLocation")? {
        Value::Array(places) => places.first()?,
        place => place,
    };
    json_text(place.pointer("/address/addressLocality"))
        .or_else(|| json_text(place.get("name")))
}

/// Title from the first `<h1>` (else `<title>`), company from `og:site_name`
fn with_page_header(html: &str, description: String) -> JobDetail {
    let document = Html::parse_document(html);
    let first_text = |css: &str| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .map(|element| element_text(&element))
            .find(|text| !text.is_empty())
    };
    let title = first_text("h1").or_else(|| first_text("title"));
    let company = Selector::parse(r#"meta[property="og:site_name"]"#)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .find_map(|meta| meta.value().attr("content"))
                .map(normalize_whitespace)
        })
        .filter(|name| !name.is_empty());

    JobDetail {
        description,
        title,
        company,
        location: None,
    }
}
