use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::Duration;

use crate::feed::fetcher::{fetch, FetchError, DEFAULT_TIMEOUT};
use crate::feed::normalize::normalize_entries;
use crate::feed::parser::{parse_feed, ParseOutcome};
use crate::model::{default_fallback_published, Article, Cutoff};

/// Default number of feeds fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Tunables for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Maximum number of feeds in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Per-feed timeout.
    pub timeout: Duration,
    /// Publish instant given to entries without a usable date.
    pub fallback_published: DateTime<Utc>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            fallback_published: default_fallback_published(),
        }
    }
}

/// A feed that could not be retrieved.
#[derive(Debug)]
pub struct FeedFailure {
    pub url: String,
    pub error: FetchError,
}

/// A feed that was retrieved but only partially understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFeed {
    pub url: String,
    pub reason: String,
}

/// Outcome of processing a single feed.
///
/// Each task produces exactly one of these; they are merged only once the
/// task has finished.
#[derive(Debug)]
struct FeedOutcome {
    url: String,
    result: Result<Vec<Article>, FetchError>,
    malformed: Option<String>,
}

/// Everything a run produced, in no particular order.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub articles: Vec<Article>,
    pub failures: Vec<FeedFailure>,
    pub malformed: Vec<MalformedFeed>,
    /// Number of non-blank URLs that were attempted
    pub feeds_attempted: usize,
}

/// Fetches, parses and filters every feed in `urls`.
///
/// Feeds are processed through a bounded pool of `options.concurrency`
/// tasks. A failing feed contributes no articles and is recorded in
/// [`Aggregation::failures`]; it never affects the other feeds. The function
/// returns only after every URL has been resolved.
///
/// URLs are trimmed; blank entries are skipped.
///
/// # Returns
///
/// Articles are returned in completion order. Use [`order_articles`] before
/// presenting them.
pub async fn aggregate<S: AsRef<str>>(
    client: &reqwest::Client,
    urls: &[S],
    cutoff: Cutoff,
    options: &AggregateOptions,
) -> Aggregation {
    let urls: Vec<String> = urls
        .iter()
        .map(|u| u.as_ref().trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        tracing::info!("No feed URLs to aggregate");
        return Aggregation::default();
    }

    let feeds_attempted = urls.len();
    let concurrency = options.concurrency.max(1);

    let outcomes: Vec<FeedOutcome> = stream::iter(urls)
        .map(|url| {
            let client = client.clone();
            let timeout = options.timeout;
            let fallback = options.fallback_published;

            async move { process_feed(&client, url, cutoff, timeout, fallback).await }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut aggregation = Aggregation {
        feeds_attempted,
        ..Aggregation::default()
    };

    for outcome in outcomes {
        if let Some(reason) = outcome.malformed {
            aggregation.malformed.push(MalformedFeed {
                url: outcome.url.clone(),
                reason,
            });
        }
        match outcome.result {
            Ok(articles) => aggregation.articles.extend(articles),
            Err(error) => aggregation.failures.push(FeedFailure {
                url: outcome.url,
                error,
            }),
        }
    }

    tracing::info!(
        feeds = feeds_attempted,
        failed = aggregation.failures.len(),
        malformed = aggregation.malformed.len(),
        articles = aggregation.articles.len(),
        cutoff = %cutoff.instant(),
        "Aggregation complete"
    );

    aggregation
}

async fn process_feed(
    client: &reqwest::Client,
    url: String,
    cutoff: Cutoff,
    timeout: Duration,
    fallback: DateTime<Utc>,
) -> FeedOutcome {
    let bytes = match fetch(client, &url, timeout).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(feed = %url, error = %error, "Failed to fetch feed");
            return FeedOutcome {
                url,
                result: Err(error),
                malformed: None,
            };
        }
    };

    let ParseOutcome { feed, malformed } = parse_feed(&bytes);

    if let Some(reason) = &malformed {
        tracing::warn!(
            feed = %url,
            reason = %reason,
            salvaged = feed.entries.len(),
            "Malformed feed, keeping salvageable entries"
        );
    }

    let entries = feed.entries.len();
    let articles = normalize_entries(feed, &url, cutoff, fallback);

    tracing::debug!(
        feed = %url,
        entries = entries,
        kept = articles.len(),
        "Feed processed"
    );

    FeedOutcome {
        url,
        result: Ok(articles),
        malformed,
    }
}

/// Sorts articles newest first.
///
/// The sort is stable, so articles with equal timestamps keep their
/// relative order and identical input always yields identical output.
pub fn order_articles(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.published.cmp(&a.published));
    articles
}
