// src/domain/value_objects.rs
use crate::error::ConstructionError;
use std::collections::HashSet;
use std::fmt;

/// Non-empty, trimmed location name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(value: &str) -> Result<Self, ConstructionError> {
        let cleaned = value.trim();
        if cleaned.is_empty() {
            return Err(ConstructionError::MissingField("location"));
        }
        Ok(Self(cleaned.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Skills with blanks removed and case-insensitive duplicates collapsed.
/// The first spelling seen is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.iter().any(|s| s == skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut skills = Vec::new();
        for skill in iter {
            let cleaned = skill.as_ref().trim();
            if cleaned.is_empty() {
                continue;
            }
            if seen.insert(cleaned.to_lowercase()) {
                skills.push(cleaned.to_string());
            }
        }
        Self(skills)
    }
}
