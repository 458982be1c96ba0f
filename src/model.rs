use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;

/// Placeholder title for entries that carry none.
pub const NO_TITLE: &str = "No title";

/// Placeholder feed title for feeds that carry none.
pub const UNKNOWN_FEED: &str = "Unknown feed";

/// Publish instant assigned to entries without a parseable date.
///
/// Entries dated this way still go through the same cutoff comparison as
/// every other article. Overridable via `fallback_published` in the config.
pub fn default_fallback_published() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 4, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// ============================================================================
// Article
// ============================================================================

/// A normalized article ready for ordering and rendering.
///
/// Articles are plain values. Two articles with identical fields are equal,
/// and duplicates coming from different feeds are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Article {
    pub title: String,
    /// Never empty for articles leaving the aggregation pipeline.
    pub link: String,
    pub published: DateTime<Utc>,
    pub feed_title: String,
    /// URL of the feed this article was read from
    pub source_url: String,
}

// ============================================================================
// Cutoff
// ============================================================================

/// The single instant below which articles are considered stale.
///
/// Computed once per run and shared by every comparison in that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    /// Builds the cutoff `now - days`.
    pub fn days_back(now: DateTime<Utc>, days: u32) -> Self {
        Self(now - TimeDelta::days(i64::from(days)))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns true if an article published at `published` is recent enough.
    /// The boundary itself is included.
    pub fn admits(&self, published: &DateTime<Utc>) -> bool {
        *published >= self.0
    }
}
