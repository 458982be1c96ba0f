//! Fetch recent articles from RSS/Atom feeds and render them into one report.
//!
//! The pipeline is: read URL list → fetch every feed concurrently (bounded)
//! → parse best-effort → normalize and filter by a single cutoff → sort
//! newest first → render.

pub mod config;
pub mod feed;
pub mod model;
pub mod report;
pub mod util;
