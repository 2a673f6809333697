// src/pipeline/enrich.rs
//! LLM extraction of tasks, skills and candidate profile notes.

use crate::config::LlmConfig;
use crate::domain::{JobRecord, SkillSet};
use crate::error::GenerationError;
use crate::llm::prompts::{load_template, render, EXTRACT_JOB_FILE, EXTRACT_JOB_TEMPLATE};
use crate::llm::{generator_from_config, parse_json_payload, string_list, DocumentGenerator};
use crate::utils::clean_entries;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct JobEnricher {
    generator: Option<Arc<dyn DocumentGenerator>>,
    template: String,
}

impl JobEnricher {
    pub fn new(generator: Option<Arc<dyn DocumentGenerator>>, template: String) -> Self {
        Self {
            generator,
            template,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            generator_from_config(config, &config.extract_model, 0.0),
            load_template(
                config.prompt_dir.as_deref(),
                EXTRACT_JOB_FILE,
                EXTRACT_JOB_TEMPLATE,
            ),
        )
    }

    /// Fill the enrichment fields in place. On failure they keep their
    /// empty defaults.
    pub async fn enrich(&self, record: &mut JobRecord) {
        match self.request(&record.description).await {
            Ok(payload) => apply_payload(record, &payload),
            Err(e) => {
                warn!(title = %record.job_title, error = %e, "Job enrichment skipped");
            }
        }
    }

    pub async fn enrich_all(&self, records: Vec<JobRecord>) -> Vec<JobRecord> {
        let mut enriched = Vec::with_capacity(records.len());
        for mut record in records {
            self.enrich(&mut record).await;
            enriched.push(record);
        }
        enriched
    }

    async fn request(&self, description: &str) -> Result<Map<String, Value>, GenerationError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| GenerationError::Unavailable("no generator configured".to_string()))?;
        let prompt = render(&self.template, &[("job_description", description)]);
        let raw = generator.generate(&prompt).await?;
        debug!(chars = raw.len(), "Extraction response received");
        Ok(parse_json_payload(&raw))
    }
}

fn apply_payload(record: &mut JobRecord, payload: &Map<String, Value>) {
    record.future_tasks = clean_entries(string_list(payload.get("futureTasks")));
    record.skills = string_list(payload.get("skills"))
        .into_iter()
        .collect::<SkillSet>()
        .into_vec();

    let notes = match payload.get("candidateProfile") {
        Some(Value::Array(_)) => string_list(payload.get("candidateProfile")).join("\n"),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let notes = notes.trim();
    record.candidate_profile_notes = (!notes.is_empty()).then(|| notes.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedGenerator(Result<String, String>);

    #[async_trait]
    impl DocumentGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.0.clone().map_err(GenerationError::InvalidResponse)
        }
    }

    fn enricher(response: Result<&str, &str>) -> JobEnricher {
        let response = response.map(str::to_string).map_err(str::to_string);
        JobEnricher::new(
            Some(Arc::new(CannedGenerator(response))),
            EXTRACT_JOB_TEMPLATE.to_string(),
        )
    }

    fn record() -> JobRecord {
        JobRecord::new("Acme", "Dev", "Berlin", "Build services in Rust").unwrap()
    }

    #[tokio::test]
    async fn test_enrich_applies_payload() {
        let enricher = enricher(Ok(
            r#"Here you go: {"futureTasks": ["Design APIs", " "], "skills": ["Rust", "rust", "SQL"], "candidateProfile": ["3+ years", "Team player"]}"#,
        ));
        let mut job = record();
        enricher.enrich(&mut job).await;
        assert_eq!(job.future_tasks, vec!["Design APIs"]);
        assert_eq!(job.skills, vec!["Rust", "SQL"]);
        assert_eq!(
            job.candidate_profile_notes.as_deref(),
            Some("3+ years\nTeam player")
        );
    }

    #[tokio::test]
    async fn test_candidate_profile_as_string() {
        let enricher = enricher(Ok(r#"{"candidateProfile": "Senior engineer", "skills": "Rust"}"#));
        let mut job = record();
        enricher.enrich(&mut job).await;
        assert_eq!(job.candidate_profile_notes.as_deref(), Some("Senior engineer"));
        assert!(job.skills.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_defaults() {
        let enricher = enricher(Err("boom"));
        let mut job = record();
        enricher.enrich(&mut job).await;
        assert_eq!(job, record());

        let unavailable = JobEnricher::new(None, EXTRACT_JOB_TEMPLATE.to_string());
        let enriched = unavailable.enrich_all(vec![record(), record()]).await;
        assert_eq!(enriched, vec![record(), record()]);
    }

    #[tokio::test]
    async fn test_enrich_all_empty() {
        let enricher = enricher(Ok("{}"));
        assert!(enricher.enrich_all(Vec::new()).await.is_empty());
    }
}
