// src/parsing/mod.rs
pub mod html_extractors;
pub mod job_detail_parser;
pub mod json_search;
pub mod link_extractor;

pub use html_extractors::{
    extract_description_by_keywords, extract_description_embedded_json,
    extract_description_json_ld, extract_json_ld_posting, extract_text_by_selector,
};
pub use job_detail_parser::{parse_job_detail, strategy_for_site, ExtractionStrategy, JobDetail};
pub use link_extractor::extract_detail_urls;

use crate::error::ExtractionError;

/// Description only, for callers that do not need the header fields
pub fn extract(html: &str, strategy: &ExtractionStrategy) -> Result<String, ExtractionError> {
    parse_job_detail(html, strategy).map(|detail| detail.description)
}
