// src/pipeline/ingest.rs
//! Search -> crawl -> parse.
//!
//! Search pages and detail pages are fetched concurrently. The result limit
//! is enforced by the single task that reaps detail fetches: a new fetch is
//! only launched while `emitted + in_flight < limit`.

use crate::config::CrawlConfig;
use crate::crawling::site_registry::source_label;
use crate::crawling::{build_search_urls, detect_site, FetchOptions, Fetcher, SiteProfile};
use crate::domain::{JobRecord, Listing, Location, SearchQuery};
use crate::error::PipelineError;
use crate::parsing::{extract_detail_urls, parse_job_detail, strategy_for_site};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Placeholder for header fields a page does not expose
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub reason: String,
}

impl CrawlFailure {
    pub fn new(url: &str, reason: impl Display) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Outcome of a crawl: what worked, what was skipped, and when it ran
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport<T> {
    pub items: Vec<T>,
    /// Detail links found on the search pages, before extraction
    pub discovered: usize,
    pub failures: Vec<CrawlFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<T> CrawlReport<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// No search page yielded a detail link
    pub fn found_no_links(&self) -> bool {
        self.discovered == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// A detail listing together with the record extracted from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedJob {
    pub listing: Listing,
    pub record: JobRecord,
}

/// One search-page listing per supported site. No network I/O.
pub fn ingest_search_listings(query: &SearchQuery) -> Vec<Listing> {
    build_search_urls(query)
        .into_iter()
        .filter_map(|url| {
            let source = source_label(detect_site(&url));
            Listing::new(&url, source).ok()
        })
        .collect()
}

/// Query-derived inputs for extraction
#[derive(Debug, Clone)]
struct ExtractionContext {
    keywords: Vec<String>,
    fallback_location: String,
}

impl ExtractionContext {
    fn new(query: Option<&SearchQuery>, config: &CrawlConfig) -> Self {
        let keywords = match query {
            Some(query) if !query.keywords.is_empty() => query.keywords.clone(),
            _ => config.fallback_keywords.clone(),
        };
        let fallback_location = query
            .and_then(|query| Location::new(&query.location).ok())
            .map(|location| location.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            keywords,
            fallback_location,
        }
    }
}

pub struct IngestPipeline<F: Fetcher + ?Sized + 'static> {
    fetcher: Arc<F>,
    config: CrawlConfig,
}

impl<F: Fetcher + ?Sized + 'static> IngestPipeline<F> {
    pub fn new(fetcher: Arc<F>, config: CrawlConfig) -> Self {
        Self { fetcher, config }
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Detail-page listings discovered from the search pages, at most `limit`
    pub async fn collect_detail_listings(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> CrawlReport<Listing> {
        let started_at = Utc::now();
        let (items, failures) = self.discover(query, Some(limit)).await;
        info!(
            listings = items.len(),
            failures = failures.len(),
            "Collected detail listings"
        );
        CrawlReport {
            discovered: items.len(),
            items,
            failures,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Fetch a single detail listing and extract its record
    pub async fn fetch_and_extract(&self, listing: &Listing) -> Result<JobRecord, PipelineError> {
        let context = ExtractionContext::new(None, &self.config);
        extract_listing(self.fetcher.as_ref(), listing, &context).await
    }

    /// Discover detail links, then fetch and extract at most `limit` records.
    /// Failed listings are reported and replaced by later ones.
    pub async fn crawl(&self, query: &SearchQuery, limit: usize) -> CrawlReport<ExtractedJob> {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", run_id = %run_id);
        self.crawl_inner(query, limit).instrument(span).await
    }

    async fn crawl_inner(&self, query: &SearchQuery, limit: usize) -> CrawlReport<ExtractedJob> {
        let started_at = Utc::now();
        info!(
            keywords = %query.joined_keywords(),
            location = %query.location,
            limit,
            "Starting crawl"
        );

        let (listings, mut failures) = if limit == 0 {
            (Vec::new(), Vec::new())
        } else {
            self.discover(query, None).await
        };
        let discovered = listings.len();
        debug!(discovered, "Detail links discovered");

        let context = Arc::new(ExtractionContext::new(Some(query), &self.config));
        let concurrency = self.concurrency();
        let mut pending = listings.into_iter().enumerate();
        let mut in_flight = JoinSet::new();
        let mut task_urls: HashMap<task::Id, String> = HashMap::new();
        let mut emitted: Vec<(usize, ExtractedJob)> = Vec::new();

        loop {
            while in_flight.len() < concurrency && emitted.len() + in_flight.len() < limit {
                let Some((index, listing)) = pending.next() else {
                    break;
                };
                let fetcher = Arc::clone(&self.fetcher);
                let context = Arc::clone(&context);
                let url = listing.url.clone();
                let handle = in_flight.spawn(
                    async move {
                        let result = extract_listing(fetcher.as_ref(), &listing, &context).await;
                        (index, listing, result)
                    }
                    .in_current_span(),
                );
                task_urls.insert(handle.id(), url);
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };
            match joined {
                Ok((id, (index, listing, Ok(record)))) => {
                    task_urls.remove(&id);
                    debug!(url = %listing.url, title = %record.job_title, "Extracted job");
                    emitted.push((index, ExtractedJob { listing, record }));
                }
                Ok((id, (_, listing, Err(e)))) => {
                    task_urls.remove(&id);
                    warn!(url = %listing.url, error = %e, "Skipping listing");
                    failures.push(CrawlFailure::new(&listing.url, e));
                }
                Err(e) => {
                    let url = task_urls.remove(&e.id()).unwrap_or_default();
                    error!(url = %url, "Detail task failed: {}", e);
                    failures.push(CrawlFailure::new(&url, e));
                }
            }
        }

        emitted.sort_by_key(|(index, _)| *index);
        let items: Vec<ExtractedJob> = emitted.into_iter().map(|(_, job)| job).collect();
        info!(
            records = items.len(),
            discovered,
            failures = failures.len(),
            "Crawl finished"
        );

        CrawlReport {
            items,
            discovered,
            failures,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Fetch every search page concurrently and gather detail links in site
    /// order. With a limit, outstanding search fetches are aborted once it
    /// is reached.
    async fn discover(
        &self,
        query: &SearchQuery,
        limit: Option<usize>,
    ) -> (Vec<Listing>, Vec<CrawlFailure>) {
        let mut listings = Vec::new();
        let mut failures = Vec::new();
        if limit == Some(0) {
            return (listings, failures);
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency()));
        let mut handles = Vec::new();
        for search in ingest_search_listings(query) {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let url = search.url.clone();
            let handle = tokio::spawn(
                async move {
                    let _permit = semaphore.acquire().await.ok();
                    let site = detect_site(&url);
                    let html = fetch_page(fetcher.as_ref(), &url, site).await?;
                    Ok::<_, PipelineError>(extract_detail_urls(&html, &url, site))
                }
                .in_current_span(),
            );
            handles.push((search, handle));
        }

        let mut seen = HashSet::new();
        let mut handles = handles.into_iter();
        'searches: while let Some((search, handle)) = handles.next() {
            let urls = match handle.await {
                Ok(Ok(urls)) => urls,
                Ok(Err(e)) => {
                    warn!(url = %search.url, error = %e, "Search page failed");
                    failures.push(CrawlFailure::new(&search.url, e));
                    continue;
                }
                Err(e) => {
                    error!(url = %search.url, "Search task failed: {}", e);
                    failures.push(CrawlFailure::new(&search.url, e));
                    continue;
                }
            };
            debug!(url = %search.url, links = urls.len(), "Search page parsed");

            for url in urls {
                if !seen.insert(url.clone()) {
                    continue;
                }
                match Listing::new(&url, &search.source) {
                    Ok(listing) => listings.push(listing),
                    Err(e) => failures.push(CrawlFailure::new(&url, e)),
                }
                if limit.is_some_and(|limit| listings.len() >= limit) {
                    info!("Reached listing limit ({})", listings.len());
                    for (_, handle) in handles.by_ref() {
                        handle.abort();
                    }
                    break 'searches;
                }
            }
        }

        (listings, failures)
    }
}

/// Fetch with the site's wait flag, then follow the iframe if the site
/// embeds its content in one
async fn fetch_page<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    site: Option<&SiteProfile>,
) -> Result<String, PipelineError> {
    let options = FetchOptions::structured_data(site.is_some_and(|s| s.wait_for_structured_data));
    let html = fetcher
        .fetch(url, &options)
        .await
        .map_err(|source| PipelineError::Fetch {
            url: url.to_string(),
            source,
        })?;

    match site {
        Some(profile) if profile.follow_iframe => {
            fetcher
                .follow_iframe(url, &html, profile.iframe_selector)
                .await
        }
        _ => Ok(html),
    }
}

async fn extract_listing<F: Fetcher + ?Sized>(
    fetcher: &F,
    listing: &Listing,
    context: &ExtractionContext,
) -> Result<JobRecord, PipelineError> {
    let site = detect_site(&listing.url);
    if site.is_none() {
        debug!(url = %listing.url, "Unknown site, using generic heuristics");
    }

    let html = fetch_page(fetcher, &listing.url, site).await?;
    let strategy = strategy_for_site(site, &context.keywords);
    let detail = parse_job_detail(&html, &strategy)?;
    debug!(url = %listing.url, strategy = strategy.name(), "Parsed job detail");

    let record = JobRecord::new(
        detail.company.as_deref().unwrap_or(UNKNOWN),
        detail.title.as_deref().unwrap_or(UNKNOWN),
        detail
            .location
            .as_deref()
            .unwrap_or(&context.fallback_location),
        &detail.description,
    )?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_listings_in_site_order() {
        let query = SearchQuery::new(["python"], "berlin");
        let sources: Vec<String> = ingest_search_listings(&query)
            .into_iter()
            .map(|listing| listing.source)
            .collect();
        assert_eq!(sources, vec!["xing", "stepstone", "linkedin", "accso"]);
    }

    #[test]
    fn test_search_listings_for_empty_query() {
        let query = SearchQuery::new(Vec::<String>::new(), "");
        let listings = ingest_search_listings(&query);
        assert_eq!(listings.len(), 4);
        assert!(listings.iter().all(|listing| !listing.url.contains(' ')));
    }

    #[test]
    fn test_context_falls_back_without_query_data() {
        let config = CrawlConfig::default();
        let context = ExtractionContext::new(None, &config);
        assert_eq!(context.keywords, vec!["job"]);
        assert_eq!(context.fallback_location, UNKNOWN);

        let query = SearchQuery::new(["rust"], "  ");
        let context = ExtractionContext::new(Some(&query), &config);
        assert_eq!(context.keywords, vec!["rust"]);
        assert_eq!(context.fallback_location, UNKNOWN);

        let query = SearchQuery::new(Vec::<String>::new(), "Berlin");
        let context = ExtractionContext::new(Some(&query), &config);
        assert_eq!(context.keywords, vec!["job"]);
        assert_eq!(context.fallback_location, "Berlin");
    }
}
