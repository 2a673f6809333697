// src/domain/mod.rs
pub mod models;
pub mod value_objects;

pub use models::{CandidateProfile, JobRecord, Listing, OptimizedDocuments, SearchQuery};
pub use value_objects::{Location, SkillSet};
