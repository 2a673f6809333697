// src/lib.rs
//! Job-board search, crawling and posting extraction, with optional
//! LLM enrichment of the extracted records.

pub mod cli;
pub mod config;
pub mod crawling;
pub mod domain;
pub mod error;
pub mod llm;
pub mod logging;
pub mod parsing;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use crawling::{build_search_urls, detect_site, FetchOptions, Fetcher, SiteProfile};
pub use domain::{CandidateProfile, JobRecord, Listing, OptimizedDocuments, SearchQuery};
pub use error::{ConstructionError, ExtractionError, GenerationError, PipelineError};
pub use parsing::{extract, extract_detail_urls, ExtractionStrategy};
pub use pipeline::{
    deduplicate_jobs, ingest_search_listings, CrawlReport, ExtractedJob, IngestPipeline,
};
