// src/config.rs
//! Layered configuration: `.env`, optional YAML file, environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "jobscout.yaml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub llm: LlmConfig,
    pub log: LogConfig,
    /// YAML file the values came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Headless-browser rendering service; plain HTTP is used when unset
    pub render_service_url: Option<String>,
    pub linkedin_cookie: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            render_service_url: None,
            linkedin_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub concurrency: usize,
    pub default_limit: usize,
    /// Keywords for block scoring when the query has none
    pub fallback_keywords: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            default_limit: 20,
            fallback_keywords: vec!["job".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub extract_model: String,
    pub optimize_model: String,
    pub timeout_seconds: u64,
    pub prompt_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            extract_model: "gpt-4o-mini".to_string(),
            optimize_model: "gpt-4o".to_string(),
            timeout_seconds: 60,
            prompt_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load `.env`, then the YAML file if any, then environment overrides
    pub fn load() -> Result<Self> {
        accept_missing_env_file(dotenvy::dotenv())?;

        let mut config = match Self::config_path() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(path) = env_var("JOBSCOUT_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(url) = env_var("RENDER_SERVICE_URL") {
            self.fetch.render_service_url = Some(url);
        }
        if let Some(secs) = env_var("FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_seconds = secs
                .parse()
                .context("FETCH_TIMEOUT_SECS must be a number of seconds")?;
        }
        if let Some(cookie) = env_var("LINKEDIN_COOKIE") {
            self.fetch.linkedin_cookie = Some(cookie);
        }
        if let Some(concurrency) = env_var("CRAWL_CONCURRENCY") {
            self.crawl.concurrency = concurrency
                .parse()
                .context("CRAWL_CONCURRENCY must be a positive integer")?;
        }
        if let Some(key) = env_var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = env_var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = env_var("LLM_EXTRACT_MODEL") {
            self.llm.extract_model = model;
        }
        if let Some(model) = env_var("LLM_OPTIMIZE_MODEL") {
            self.llm.optimize_model = model;
        }
        if let Some(level) = env_var("JOBSCOUT_LOG") {
            self.log.level = level;
        }
        if let Some(file) = env_var("JOBSCOUT_LOG_FILE") {
            self.log.file = Some(PathBuf::from(file));
        }
        Ok(())
    }
}

/// A missing `.env` file is fine; one that cannot be read or parsed is not
fn accept_missing_env_file<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

/// Trimmed value of an environment variable; `None` when unset or blank
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fetch.timeout_seconds, 20);
        assert_eq!(config.crawl.concurrency, 4);
        assert_eq!(config.crawl.fallback_keywords, vec!["job"]);
        assert_eq!(config.llm.extract_model, "gpt-4o-mini");
        assert_eq!(config.llm.optimize_model, "gpt-4o");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
fetch:
  render_service_url: "http://localhost:3000"
crawl:
  concurrency: 8
"#,
        )
        .unwrap();
        assert_eq!(
            config.fetch.render_service_url.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.fetch.timeout_seconds, 20);
        assert_eq!(config.crawl.concurrency, 8);
        assert_eq!(config.crawl.default_limit, 20);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_from_file_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobscout.yaml");
        std::fs::write(&path, "crawl:\n  default_limit: 7\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.crawl.default_limit, 7);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert!(AppConfig::default().source.is_none());
    }

    #[test]
    fn test_missing_env_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dotenvy::from_path(dir.path().join(".env"));
        assert!(accept_missing_env_file(missing).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "JOBSCOUT_TEST_MALFORMED value without equals\n").unwrap();

        let err = accept_missing_env_file(dotenvy::from_path(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load .env file"));
        assert_eq!(env_var("JOBSCOUT_TEST_MALFORMED"), None);
    }

    #[test]
    fn test_env_var_ignores_blank_values() {
        std::env::set_var("JOBSCOUT_TEST_BLANK", "   ");
        std::env::set_var("JOBSCOUT_TEST_SET", "  value ");
        assert_eq!(env_var("JOBSCOUT_TEST_BLANK"), None);
        assert_eq!(env_var("JOBSCOUT_TEST_SET").as_deref(), Some("value"));
        assert_eq!(env_var("JOBSCOUT_TEST_NEVER_SET"), None);
    }
}
