// src/storage/mod.rs
pub mod file_store;
pub mod json_repository;

pub use json_repository::JsonRepository;
