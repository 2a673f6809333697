// src/storage/file_store.rs
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            info!("Created directory: {}", parent.display());
        }
    }
    Ok(())
}

pub async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write `content`, creating parent directories as needed
pub async fn write_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dir(path).await?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    info!("Written file: {}", path.display());
    Ok(())
}
