// src/storage/json_repository.rs
//! Job records persisted as a single JSON array.

use super::file_store::{read_text, write_text};
use crate::domain::JobRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonRepository {
    path: PathBuf,
}

impl JsonRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save_jobs(&self, jobs: &[JobRecord]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(jobs).context("Failed to serialize job records")?;
        write_text(&self.path, &content).await?;
        info!("Saved {} job records to {}", jobs.len(), self.path.display());
        Ok(())
    }

    /// Load and re-validate every record
    pub async fn load_jobs(&self) -> Result<Vec<JobRecord>> {
        let content = read_text(&self.path).await?;
        let jobs: Vec<JobRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid job records in {}", self.path.display()))?;
        for (index, job) in jobs.iter().enumerate() {
            job.validate()
                .with_context(|| format!("Invalid job record #{} in {}", index, self.path.display()))?;
        }
        Ok(jobs)
    }
}
