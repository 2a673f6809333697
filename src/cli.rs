// src/cli.rs
use crate::config::{env_var, AppConfig, CrawlConfig};
use crate::crawling::{build_fetcher, Fetcher};
use crate::domain::{CandidateProfile, SearchQuery};
use crate::pipeline::{
    deduplicate_by, ingest_search_listings, job_key, CrawlReport, DocumentOptimizer,
    ExtractedJob, IngestPipeline, JobEnricher,
};
use crate::storage::JsonRepository;
use crate::utils::{get_file_extension, split_list};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "jobscout")]
#[command(about = "Search job boards, extract postings and tailor application documents")]
pub struct Cli {
    /// Comma-separated keywords
    #[arg(long)]
    pub keywords: String,

    #[arg(long)]
    pub location: String,

    /// Maximum number of job links to return
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only print search URLs (do not fetch search pages)
    #[arg(long)]
    pub no_fetch: bool,

    /// Fetch job pages and output optimized keywords
    #[arg(long)]
    pub optimize: bool,

    /// Write the extracted job records to this JSON file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Candidate profile TOML file
    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long)]
    pub profile_summary: Option<String>,

    /// Comma-separated skills
    #[arg(long)]
    pub profile_skills: Option<String>,

    /// Comma-separated experiences
    #[arg(long)]
    pub profile_experiences: Option<String>,

    /// Comma-separated projects
    #[arg(long)]
    pub profile_projects: Option<String>,

    /// CV file (PDF or text)
    #[arg(long)]
    pub cv_path: Option<PathBuf>,

    /// Motivation letter file (PDF or text)
    #[arg(long)]
    pub motivation_path: Option<PathBuf>,
}

impl Cli {
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(split_list(&self.keywords), &self.location)
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let fetcher = build_fetcher(&config.fetch)?;
    Runner::from_config(fetcher, &config)
        .execute(&cli, &mut std::io::stdout())
        .await
}

/// The CLI modes over an injected fetcher and document generators
pub struct Runner {
    pipeline: IngestPipeline<dyn Fetcher>,
    enricher: JobEnricher,
    optimizer: DocumentOptimizer,
    default_limit: usize,
}

impl Runner {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        crawl: CrawlConfig,
        enricher: JobEnricher,
        optimizer: DocumentOptimizer,
    ) -> Self {
        Self {
            default_limit: crawl.default_limit,
            pipeline: IngestPipeline::new(fetcher, crawl),
            enricher,
            optimizer,
        }
    }

    pub fn from_config(fetcher: Arc<dyn Fetcher>, config: &AppConfig) -> Self {
        Self::new(
            fetcher,
            config.crawl.clone(),
            JobEnricher::from_config(&config.llm),
            DocumentOptimizer::from_config(&config.llm),
        )
    }

    pub async fn execute<W: Write>(&self, cli: &Cli, out: &mut W) -> Result<()> {
        let query = cli.query();

        if cli.no_fetch {
            return write_search_urls(out, &query);
        }

        let limit = cli.limit.unwrap_or(self.default_limit);

        if !cli.optimize && cli.save.is_none() {
            let report = self.pipeline.collect_detail_listings(&query, limit).await;
            if report.found_no_links() {
                return write_no_results(out, &query);
            }
            for listing in &report.items {
                writeln!(out, "{}", listing.url)?;
            }
            return Ok(());
        }

        let report = self.pipeline.crawl(&query, limit).await;
        info!(
            records = report.items.len(),
            discovered = report.discovered,
            failures = report.failures.len(),
            elapsed_ms = report.duration_ms(),
            "Crawl report"
        );
        if report.found_no_links() {
            return write_no_results(out, &query);
        }
        if report.is_empty() {
            return write_failures(out, &report);
        }

        let jobs = deduplicate_by(report.items, |job| job_key(&job.record));
        let (listings, records): (Vec<_>, Vec<_>) =
            jobs.into_iter().map(|job| (job.listing, job.record)).unzip();

        if !cli.optimize {
            for listing in &listings {
                writeln!(out, "{}", listing.url)?;
            }
            if let Some(path) = &cli.save {
                JsonRepository::new(path).save_jobs(&records).await?;
            }
            return Ok(());
        }

        let records = self.enricher.enrich_all(records).await;

        let profile = build_profile(cli).await?;
        let cv_text = read_document(cli.cv_path.clone().or_else(|| env_path("CV_PATH"))).await;
        let letter = read_document(
            cli.motivation_path
                .clone()
                .or_else(|| env_path("MOTIVATION_LETTER_PATH")),
        )
        .await;

        let documents = self
            .optimizer
            .optimize_all(
                &profile,
                &records,
                non_empty(&cv_text),
                non_empty(&letter),
            )
            .await;

        let optimized: Vec<_> = records
            .iter()
            .zip(&documents)
            .map(|(record, docs)| record.with_optimization(docs))
            .collect();

        for (listing, docs) in listings.iter().zip(&documents) {
            writeln!(out, "{}\t{}", listing.url, docs.optimized_keywords.join(", "))?;
        }

        if let Some(path) = &cli.save {
            JsonRepository::new(path).save_jobs(&optimized).await?;
        }
        Ok(())
    }
}

fn write_search_urls<W: Write>(out: &mut W, query: &SearchQuery) -> Result<()> {
    for listing in ingest_search_listings(query) {
        writeln!(out, "{}", listing.url)?;
    }
    Ok(())
}

fn write_no_results<W: Write>(out: &mut W, query: &SearchQuery) -> Result<()> {
    writeln!(out, "No job listings found from search pages.")?;
    writeln!(out, "Search URLs:")?;
    write_search_urls(out, query)
}

/// Detail links were found but none of them produced a record
fn write_failures<W: Write>(out: &mut W, report: &CrawlReport<ExtractedJob>) -> Result<()> {
    writeln!(
        out,
        "No job records could be extracted from {} detail links.",
        report.discovered
    )?;
    writeln!(out, "Failed URLs:")?;
    for failure in &report.failures {
        writeln!(out, "{}\t{}", failure.url, failure.reason)?;
    }
    Ok(())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_var(name).map(PathBuf::from)
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.trim().is_empty()).then_some(text)
}

/// Profile file first, then CLI flags, then `CANDIDATE_*` variables
async fn build_profile(cli: &Cli) -> Result<CandidateProfile> {
    let base = match &cli.profile {
        Some(path) => CandidateProfile::from_toml_file(path)
            .await
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => CandidateProfile::default(),
    };

    let text = |flag: &Option<String>, var: &str| flag.clone().or_else(|| env_var(var));
    let list = |flag: &Option<String>, var: &str, fallback: &[String]| match text(flag, var) {
        Some(value) => split_list(&value),
        None => fallback.to_vec(),
    };

    let summary =
        text(&cli.profile_summary, "CANDIDATE_SUMMARY").unwrap_or_else(|| base.summary.clone());
    Ok(CandidateProfile::new(
        &summary,
        list(&cli.profile_skills, "CANDIDATE_SKILLS", &base.skills),
        list(&cli.profile_experiences, "CANDIDATE_EXPERIENCES", &base.experiences),
        list(&cli.profile_projects, "CANDIDATE_PROJECTS", &base.projects),
    ))
}

/// Text of a CV or letter; PDFs go through text extraction. Unreadable
/// files yield empty text.
pub async fn read_document(path: Option<PathBuf>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match load_document(&path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Ignoring unreadable document {}: {:#}", path.display(), e);
            String::new()
        }
    }
}

async fn load_document(path: &Path) -> Result<String> {
    let is_pdf = path
        .to_str()
        .and_then(get_file_extension)
        .is_some_and(|ext| ext == "pdf");

    if !is_pdf {
        return crate::storage::file_store::read_text(path).await;
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .context("PDF extraction task failed")?
        .map_err(|e| anyhow::anyhow!("Failed to extract text from {}: {}", path.display(), e))?;
    Ok(text.trim().to_string())
}
