use anyhow::{Context, Result};

use super::ReportContext;

/// Renders the report as a pretty-printed JSON document:
/// `{ "generated_at", "days_back", "articles": [...] }`.
pub fn render_json(ctx: &ReportContext<'_>) -> Result<String> {
    let mut out = serde_json::to_string_pretty(ctx).context("Failed to serialize report")?;
    out.push('\n');
    Ok(out)
}
