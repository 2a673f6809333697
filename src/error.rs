// src/error.rs
//! Error taxonomy for the ingestion pipeline.
//!
//! Per-listing failures are typed so the crawl loop can record them and move
//! on; application boundaries wrap these in `anyhow`.

use thiserror::Error;

/// A required data-model field was empty, or a bounded value was out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be between 0.0 and 1.0")]
    OutOfRange { field: &'static str },
}

/// The selected extraction strategy found no matching content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extraction failed ({strategy}): {message}")]
pub struct ExtractionError {
    pub strategy: &'static str,
    pub message: String,
}

impl ExtractionError {
    pub fn new(strategy: &'static str, message: impl Into<String>) -> Self {
        Self {
            strategy,
            message: message.into(),
        }
    }
}

/// Failure of a single listing's fetch/extract unit of work.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed for {url}: {source:#}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("no iframe matching `{selector}` found on {url}")]
    IframeNotFound { url: String, selector: String },
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// The document generator failed or produced unusable output.
///
/// Callers recover with a deterministic placeholder; this never crosses the
/// enrich/optimize boundary.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("document generator unavailable: {0}")]
    Unavailable(String),
    #[error("generator request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generator returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generator returned an unusable response: {0}")]
    InvalidResponse(String),
}
