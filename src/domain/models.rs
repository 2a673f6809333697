// src/domain/models.rs
//! Core records flowing through the search, crawl and optimization stages.

use crate::error::ConstructionError;
use crate::utils::clean_entries;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Search parameters, normalized once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub location: String,
}

impl SearchQuery {
    pub fn new<I, S>(keywords: I, location: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: clean_entries(keywords),
            location: location.trim().to_string(),
        }
    }

    /// Keywords joined with single spaces, as sent to query-parameter sites
    pub fn joined_keywords(&self) -> String {
        self.keywords.join(" ")
    }
}

/// A page to visit: either a search page or a job detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub url: String,
    pub source: String,
}

impl Listing {
    pub fn new(url: &str, source: &str) -> Result<Self, ConstructionError> {
        let url = url.trim();
        let source = source.trim();
        if url.is_empty() {
            return Err(ConstructionError::MissingField("url"));
        }
        if source.is_empty() {
            return Err(ConstructionError::MissingField("source"));
        }
        Ok(Self {
            url: url.to_string(),
            source: source.to_string(),
        })
    }
}

/// Structured job posting after extraction, optionally enriched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub company_name: String,
    pub job_title: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub future_tasks: Vec<String>,
    #[serde(default)]
    pub candidate_profile_notes: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub optimized_keywords: Vec<String>,
}

impl JobRecord {
    pub fn new(
        company_name: &str,
        job_title: &str,
        location: &str,
        description: &str,
    ) -> Result<Self, ConstructionError> {
        let record = Self {
            company_name: company_name.trim().to_string(),
            job_title: job_title.trim().to_string(),
            location: location.trim().to_string(),
            description: description.trim().to_string(),
            future_tasks: Vec::new(),
            candidate_profile_notes: None,
            skills: Vec::new(),
            match_score: None,
            optimized_keywords: Vec::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Re-check the invariants, e.g. after deserializing a stored record
    pub fn validate(&self) -> Result<(), ConstructionError> {
        let required = [
            ("companyName", &self.company_name),
            ("jobTitle", &self.job_title),
            ("location", &self.location),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConstructionError::MissingField(field));
            }
        }
        if let Some(score) = self.match_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ConstructionError::OutOfRange { field: "matchScore" });
            }
        }
        Ok(())
    }

    /// Copy of this record carrying the optimizer's score and keywords
    pub fn with_optimization(&self, documents: &OptimizedDocuments) -> Self {
        Self {
            match_score: Some(documents.match_score),
            optimized_keywords: documents.optimized_keywords.clone(),
            ..self.clone()
        }
    }
}

/// Candidate data used when rewriting documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl CandidateProfile {
    pub fn new(
        summary: &str,
        skills: Vec<String>,
        experiences: Vec<String>,
        projects: Vec<String>,
    ) -> Self {
        Self {
            summary: summary.trim().to_string(),
            skills: clean_entries(skills),
            experiences: clean_entries(experiences),
            projects: clean_entries(projects),
        }
    }

    /// Parse a profile from TOML (`summary`, `skills`, `experiences`, `projects`)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: CandidateProfile =
            toml::from_str(content).context("Failed to parse candidate profile TOML")?;
        Ok(Self::new(
            &raw.summary,
            raw.skills,
            raw.experiences,
            raw.projects,
        ))
    }

    pub async fn from_toml_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Flatten the profile into the text block handed to the generator
    pub fn to_prompt_text(&self) -> String {
        let mut parts = vec![self.summary.clone()];
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        if !self.experiences.is_empty() {
            parts.push(format!("Experience: {}", self.experiences.join("; ")));
        }
        if !self.projects.is_empty() {
            parts.push(format!("Projects: {}", self.projects.join("; ")));
        }
        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rewritten CV and motivation letter with a match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedDocuments {
    pub cv_text: String,
    pub motivation_letter: String,
    pub match_score: f64,
    pub optimized_keywords: Vec<String>,
}

impl OptimizedDocuments {
    pub fn new(
        cv_text: &str,
        motivation_letter: &str,
        match_score: f64,
        optimized_keywords: Vec<String>,
    ) -> Result<Self, ConstructionError> {
        let cv_text = cv_text.trim();
        let motivation_letter = motivation_letter.trim();
        if cv_text.is_empty() {
            return Err(ConstructionError::MissingField("cvText"));
        }
        if motivation_letter.is_empty() {
            return Err(ConstructionError::MissingField("motivationLetter"));
        }
        if !(0.0..=1.0).contains(&match_score) {
            return Err(ConstructionError::OutOfRange { field: "matchScore" });
        }
        Ok(Self {
            cv_text: cv_text.to_string(),
            motivation_letter: motivation_letter.to_string(),
            match_score,
            optimized_keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_drops_blank_keywords() {
        let query = SearchQuery::new(["  python ", "   ", "", "\t"], "  Berlin ");
        assert_eq!(query.keywords, vec!["python"]);
        assert_eq!(query.location, "Berlin");
        assert!(query.keywords.iter().all(|kw| !kw.trim().is_empty()));
    }

    #[test]
    fn test_search_query_allows_empty_fields() {
        let query = SearchQuery::new(Vec::<String>::new(), "");
        assert!(query.keywords.is_empty());
        assert_eq!(query.joined_keywords(), "");
    }

    #[test]
    fn test_listing_requires_url_and_source() {
        assert!(Listing::new("https://www.xing.com/jobs/1", "xing").is_ok());
        assert_eq!(
            Listing::new("  ", "xing"),
            Err(ConstructionError::MissingField("url"))
        );
        assert_eq!(
            Listing::new("https://x", " "),
            Err(ConstructionError::MissingField("source"))
        );
    }

    #[test]
    fn test_job_record_trims_and_validates() {
        let record = JobRecord::new(" Acme ", "Dev", "Berlin", " Build things ").unwrap();
        assert_eq!(record.company_name, "Acme");
        assert_eq!(record.description, "Build things");

        assert_eq!(
            JobRecord::new("Acme", "  ", "Berlin", "desc"),
            Err(ConstructionError::MissingField("jobTitle"))
        );
        assert_eq!(
            JobRecord::new("Acme", "Dev", "Berlin", ""),
            Err(ConstructionError::MissingField("description"))
        );
    }

    #[test]
    fn test_job_record_serializes_camel_case() {
        let record = JobRecord::new("Acme", "Dev", "Berlin", "desc").unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["companyName"], "Acme");
        assert_eq!(value["jobTitle"], "Dev");
        assert!(value["futureTasks"].as_array().unwrap().is_empty());
        assert!(value["matchScore"].is_null());
    }

    #[test]
    fn test_with_optimization_leaves_original_untouched() {
        let record = JobRecord::new("Acme", "Dev", "Berlin", "desc").unwrap();
        let docs =
            OptimizedDocuments::new("cv", "letter", 0.8, vec!["rust".to_string()]).unwrap();
        let optimized = record.with_optimization(&docs);
        assert_eq!(optimized.match_score, Some(0.8));
        assert_eq!(optimized.optimized_keywords, vec!["rust"]);
        assert_eq!(record.match_score, None);
    }

    #[test]
    fn test_optimized_documents_bounds() {
        assert!(OptimizedDocuments::new("cv", "letter", 1.0, vec![]).is_ok());
        assert_eq!(
            OptimizedDocuments::new("cv", "letter", 1.5, vec![]),
            Err(ConstructionError::OutOfRange { field: "matchScore" })
        );
        assert_eq!(
            OptimizedDocuments::new(" ", "letter", 0.5, vec![]),
            Err(ConstructionError::MissingField("cvText"))
        );
    }

    #[test]
    fn test_candidate_profile_from_toml() {
        let profile = CandidateProfile::from_toml_str(
            r#"
summary = "  Backend engineer "
skills = ["Rust", " ", "SQL"]
experiences = ["5 years at Acme"]
"#,
        )
        .unwrap();
        assert_eq!(profile.summary, "Backend engineer");
        assert_eq!(profile.skills, vec!["Rust", "SQL"]);
        assert!(profile.projects.is_empty());
        assert_eq!(
            profile.to_prompt_text(),
            "Backend engineer\nSkills: Rust, SQL\nExperience: 5 years at Acme"
        );
    }
}
