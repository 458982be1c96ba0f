use std::path::Path;

use anyhow::{Context, Result};

/// Extracts feed URLs from the text of a URL list.
///
/// One URL per line. Surrounding whitespace (including `\r` from files
/// saved on Windows) is stripped, blank lines and lines starting with `#`
/// are skipped. Order is preserved and duplicates are kept.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads a URL list file from disk. See [`parse_url_list`].
pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read feed list: {}", path.display()))?;
    let urls = parse_url_list(&content);
    tracing::debug!(path = %path.display(), count = urls.len(), "Loaded feed list");
    Ok(urls)
}
