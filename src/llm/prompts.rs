// src/llm/prompts.rs
//! Prompt templates. `{name}` placeholders are substituted verbatim.

use std::path::Path;
use tracing::warn;

pub const EXTRACT_JOB_FILE: &str = "extract_job.md";
pub const OPTIMIZE_DOCUMENTS_FILE: &str = "optimized_cv.md";

pub const EXTRACT_JOB_TEMPLATE: &str = r#"Read the job description below and answer with a single JSON object:
{"futureTasks": [string], "skills": [string], "candidateProfile": [string]}

Job description:
{job_description}
"#;

pub const OPTIMIZE_DOCUMENTS_TEMPLATE: &str = r#"Rewrite the candidate's CV and motivation letter for the job below.
Answer with a single JSON object:
{"cv_text": string, "motivation_letter": string, "match_score": number between 0 and 1, "optimized_keywords": [string]}

Job description:
{job_description}

Candidate profile:
{candidate_profile}

Current CV:
{cv_text}

Current motivation letter:
{motivation_letter}
"#;

/// Template from `dir/file` when present and readable, else the built-in one
pub fn load_template(dir: Option<&Path>, file: &str, builtin: &'static str) -> String {
    let Some(dir) = dir else {
        return builtin.to_string();
    };
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(template) => template,
        Err(e) => {
            warn!("Using built-in prompt, failed to read {}: {}", path.display(), e);
            builtin.to_string()
        }
    }
}

pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
}
