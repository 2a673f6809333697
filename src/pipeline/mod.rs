// src/pipeline/mod.rs
pub mod dedup;
pub mod enrich;
pub mod ingest;
pub mod optimize;

pub use dedup::{deduplicate_by, deduplicate_jobs, job_key};
pub use enrich::JobEnricher;
pub use ingest::{
    ingest_search_listings, CrawlFailure, CrawlReport, ExtractedJob, IngestPipeline,
};
pub use optimize::DocumentOptimizer;
