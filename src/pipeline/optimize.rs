// src/pipeline/optimize.rs
//! CV and motivation letter rewriting against a job description.
//!
//! Output is always usable: a missing generator, a failed call or an invalid
//! payload all produce the placeholder documents for the job.

use crate::config::LlmConfig;
use crate::domain::{CandidateProfile, JobRecord, OptimizedDocuments};
use crate::error::GenerationError;
use crate::llm::prompts::{
    load_template, render, OPTIMIZE_DOCUMENTS_FILE, OPTIMIZE_DOCUMENTS_TEMPLATE,
};
use crate::llm::{generator_from_config, parse_json_payload, string_list, DocumentGenerator};
use crate::utils::clean_entries;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_MATCH_SCORE: f64 = 0.5;

pub struct DocumentOptimizer {
    generator: Option<Arc<dyn DocumentGenerator>>,
    template: String,
}

impl DocumentOptimizer {
    pub fn new(generator: Option<Arc<dyn DocumentGenerator>>, template: String) -> Self {
        Self {
            generator,
            template,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            generator_from_config(config, &config.optimize_model, 0.2),
            load_template(
                config.prompt_dir.as_deref(),
                OPTIMIZE_DOCUMENTS_FILE,
                OPTIMIZE_DOCUMENTS_TEMPLATE,
            ),
        )
    }

    pub async fn optimize(
        &self,
        profile: &CandidateProfile,
        job: &JobRecord,
        cv_text: Option<&str>,
        motivation_letter: Option<&str>,
    ) -> OptimizedDocuments {
        let result = self
            .request(profile, job, cv_text, motivation_letter)
            .await
            .and_then(|payload| to_documents(&payload, job));

        match result {
            Ok(documents) => documents,
            Err(e) => {
                warn!(title = %job.job_title, error = %e, "Using placeholder documents");
                placeholder(job)
            }
        }
    }

    /// One result per job, in input order
    pub async fn optimize_all(
        &self,
        profile: &CandidateProfile,
        jobs: &[JobRecord],
        cv_text: Option<&str>,
        motivation_letter: Option<&str>,
    ) -> Vec<OptimizedDocuments> {
        info!("Optimizing documents for {} jobs", jobs.len());
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push(self.optimize(profile, job, cv_text, motivation_letter).await);
        }
        results
    }

    async fn request(
        &self,
        profile: &CandidateProfile,
        job: &JobRecord,
        cv_text: Option<&str>,
        motivation_letter: Option<&str>,
    ) -> Result<Map<String, Value>, GenerationError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| GenerationError::Unavailable("no generator configured".to_string()))?;
        let profile_text = profile.to_prompt_text();
        let prompt = render(
            &self.template,
            &[
                ("job_description", job.description.as_str()),
                ("candidate_profile", profile_text.as_str()),
                ("cv_text", cv_text.unwrap_or_default()),
                ("motivation_letter", motivation_letter.unwrap_or_default()),
            ],
        );
        let raw = generator.generate(&prompt).await?;
        Ok(parse_json_payload(&raw))
    }
}

/// Deterministic documents used whenever generation is not possible
pub fn placeholder(job: &JobRecord) -> OptimizedDocuments {
    OptimizedDocuments {
        cv_text: placeholder_cv(job),
        motivation_letter: placeholder_letter(job),
        match_score: DEFAULT_MATCH_SCORE,
        optimized_keywords: Vec::new(),
    }
}

fn placeholder_cv(job: &JobRecord) -> String {
    format!("Optimized CV for {}", job.job_title)
}

fn placeholder_letter(job: &JobRecord) -> String {
    format!("Optimized motivation letter for {}", job.company_name)
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Numbers and numeric strings; anything else is the default score
fn parse_score(value: Option<&Value>) -> f64 {
    let score = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    score.unwrap_or(DEFAULT_MATCH_SCORE)
}

fn to_documents(
    payload: &Map<String, Value>,
    job: &JobRecord,
) -> Result<OptimizedDocuments, GenerationError> {
    let cv_text = non_empty_text(payload.get("cv_text")).unwrap_or_else(|| placeholder_cv(job));
    let letter = non_empty_text(payload.get("motivation_letter"))
        .unwrap_or_else(|| placeholder_letter(job));
    let keywords = clean_entries(string_list(payload.get("optimized_keywords")));

    OptimizedDocuments::new(
        &cv_text,
        &letter,
        parse_score(payload.get("match_score")),
        keywords,
    )
    .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}
