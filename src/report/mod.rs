//! Report rendering and output.
//!
//! The renderer receives the ordered articles, the recency window and the
//! generation time, and returns the finished document as a string. It never
//! fetches or filters anything itself.

mod html;
mod json;
mod write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Article;

pub use html::render_html;
pub use json::render_json;
pub use write::write_report;

/// Everything a renderer is given.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext<'a> {
    pub generated_at: DateTime<Utc>,
    pub days_back: u32,
    /// Newest first. May be empty.
    pub articles: &'a [Article],
}

/// Document format of the written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

/// Renders `ctx` in the requested format.
pub fn render(ctx: &ReportContext<'_>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Html => Ok(render_html(ctx)),
        OutputFormat::Json => render_json(ctx),
    }
}
