// src/pipeline/dedup.rs
use crate::domain::JobRecord;
use std::collections::HashSet;
use std::hash::Hash;

/// Lowercased (company, location, title) identity of a posting
pub fn job_key(record: &JobRecord) -> (String, String, String) {
    (
        record.company_name.to_lowercase(),
        record.location.to_lowercase(),
        record.job_title.to_lowercase(),
    )
}

/// Keep the first item per key, preserving order
pub fn deduplicate_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

pub fn deduplicate_jobs(records: Vec<JobRecord>) -> Vec<JobRecord> {
    deduplicate_by(records, job_key)
}
