//! Feed acquisition and aggregation.
//!
//! - [`fetcher`] - Single-attempt HTTP retrieval with a per-feed timeout
//! - [`parser`] - Best-effort RSS/Atom parsing using `feed-rs`, with a
//!   lenient `quick-xml` scan for documents it rejects
//! - [`normalize`] - Default resolution and recency filtering
//! - [`aggregate`] - Bounded concurrent fan-out/fan-in and ordering
//! - [`urls`] - Reading the line-oriented feed list
//!
//! # Example
//!
//! ```ignore
//! use feedreport::feed::{aggregate, build_client, order_articles, AggregateOptions};
//! use feedreport::model::Cutoff;
//!
//! let client = build_client("feedreport/0.1")?;
//! let cutoff = Cutoff::days_back(chrono::Utc::now(), 7);
//! let run = aggregate(&client, &urls, cutoff, &AggregateOptions::default()).await;
//! let articles = order_articles(run.articles);
//! ```

pub mod aggregate;
pub mod fetcher;
pub mod normalize;
pub mod parser;
pub mod urls;

pub use aggregate::{
    aggregate, order_articles, AggregateOptions, Aggregation, FeedFailure, MalformedFeed,
    DEFAULT_CONCURRENCY,
};
pub use fetcher::{build_client, fetch, FetchError, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use normalize::normalize_entries;
pub use parser::{parse_feed, ParseOutcome, ParsedFeed, RawEntry};
pub use urls::{parse_url_list, read_url_list};
