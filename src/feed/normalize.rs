use chrono::{DateTime, Utc};

use crate::feed::parser::ParsedFeed;
use crate::model::{Article, Cutoff, NO_TITLE, UNKNOWN_FEED};

/// Turns the entries of a parsed feed into articles.
///
/// Defaults are resolved here and nowhere else: a missing title becomes
/// [`NO_TITLE`], a missing feed title [`UNKNOWN_FEED`], a missing date the
/// `fallback` instant. Entries without a link, or published before the
/// cutoff, are dropped without being reported.
pub fn normalize_entries(
    feed: ParsedFeed,
    source_url: &str,
    cutoff: Cutoff,
    fallback: DateTime<Utc>,
) -> Vec<Article> {
    let feed_title = feed.title.unwrap_or_else(|| UNKNOWN_FEED.to_string());

    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.link.unwrap_or_default();
            let published = entry.published.unwrap_or(fallback);

            if link.is_empty() || !cutoff.admits(&published) {
                return None;
            }

            Some(Article {
                title: entry.title.unwrap_or_else(|| NO_TITLE.to_string()),
                link,
                published,
                feed_title: feed_title.clone(),
                source_url: source_url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parser::RawEntry;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const SOURCE: &str = "https://example.com/feed.xml";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn entry(title: Option<&str>, link: Option<&str>, age_days: Option<i64>) -> RawEntry {
        RawEntry {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            published: age_days.map(|d| now() - TimeDelta::days(d)),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let feed = ParsedFeed {
            title: None,
            entries: vec![entry(None, Some("https://example.com/a"), Some(1))],
        };
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), now());

        assert_eq!(
            articles,
            vec![Article {
                title: NO_TITLE.to_string(),
                link: "https://example.com/a".to_string(),
                published: now() - TimeDelta::days(1),
                feed_title: UNKNOWN_FEED.to_string(),
                source_url: SOURCE.to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_link_dropped() {
        let feed = ParsedFeed {
            title: Some("Feed".to_string()),
            entries: vec![
                entry(Some("no link"), None, Some(1)),
                entry(Some("empty link"), Some(""), Some(1)),
            ],
        };
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), now());
        assert!(articles.is_empty());
    }

    #[test]
    fn test_stale_entries_dropped() {
        let feed = ParsedFeed {
            title: Some("Feed".to_string()),
            entries: vec![
                entry(Some("fresh"), Some("https://example.com/fresh"), Some(1)),
                entry(Some("stale"), Some("https://example.com/stale"), Some(40)),
            ],
        };
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "fresh");
        assert_eq!(articles[0].feed_title, "Feed");
    }

    #[test]
    fn test_undated_entry_gets_fallback_not_dropped() {
        let feed = ParsedFeed {
            title: Some("Feed".to_string()),
            entries: vec![entry(Some("undated"), Some("https://example.com/u"), None)],
        };
        let fallback = now() - TimeDelta::days(2);
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), fallback);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].published, fallback);
    }

    #[test]
    fn test_undated_entry_still_subject_to_cutoff() {
        let feed = ParsedFeed {
            title: Some("Feed".to_string()),
            entries: vec![entry(Some("undated"), Some("https://example.com/u"), None)],
        };
        let fallback = now() - TimeDelta::days(30);
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), fallback);
        assert!(articles.is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        let feed = ParsedFeed {
            title: Some("Feed".to_string()),
            entries: vec![
                entry(Some("same"), Some("https://example.com/s"), Some(1)),
                entry(Some("same"), Some("https://example.com/s"), Some(1)),
            ],
        };
        let articles = normalize_entries(feed, SOURCE, Cutoff::days_back(now(), 7), now());
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0], articles[1]);
    }

    fn arb_entry() -> impl Strategy<Value = RawEntry> {
        (
            proptest::option::of("[a-z]{0,8}"),
            proptest::option::of(prop_oneof![Just(String::new()), "https://example\\.com/[a-z]{1,6}"]),
            proptest::option::of(-5i64..60),
        )
            .prop_map(|(title, link, age)| RawEntry {
                title,
                link,
                published: age.map(|d| now() - TimeDelta::days(d)),
            })
    }

    proptest! {
        #[test]
        fn prop_output_has_link_and_is_recent(
            entries in proptest::collection::vec(arb_entry(), 0..40),
            days in 0u32..50,
            fallback_age in 0i64..60,
        ) {
            let cutoff = Cutoff::days_back(now(), days);
            let fallback = now() - TimeDelta::days(fallback_age);
            let feed = ParsedFeed { title: None, entries };
            for article in normalize_entries(feed, SOURCE, cutoff, fallback) {
                prop_assert!(!article.link.is_empty());
                prop_assert!(article.published >= cutoff.instant());
            }
        }
    }
}
