use chrono::{DateTime, Utc};
use feed_rs::parser;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::util::clean_text;

/// One entry as it appears in a feed, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// Structured content of one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Result of a best-effort parse.
///
/// `malformed` is set when the document could not be fully understood. The
/// feed then holds whatever the recovery scanner managed to salvage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub feed: ParsedFeed,
    pub malformed: Option<String>,
}

/// Parses RSS, Atom or JSON Feed bytes. Never fails.
///
/// Well-formed documents go through `feed-rs`. Anything it rejects is handed
/// to a lenient XML scanner that collects titles, links and dates from every
/// `<item>`/`<entry>` it can read before the markup breaks down.
pub fn parse_feed(bytes: &[u8]) -> ParseOutcome {
    match parser::parse(bytes) {
        Ok(feed) => {
            let entries = feed
                .entries
                .into_iter()
                .map(|entry| RawEntry {
                    title: entry.title.and_then(|t| clean_text(&t.content)),
                    // Atom entries may list replies/edit/self links ahead of the post
                    link: entry
                        .links
                        .iter()
                        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                        .or_else(|| entry.links.first())
                        .and_then(|l| clean_text(&l.href)),
                    published: entry.published.or(entry.updated),
                })
                .collect();

            ParseOutcome {
                feed: ParsedFeed {
                    title: feed.title.and_then(|t| clean_text(&t.content)),
                    entries,
                },
                malformed: None,
            }
        }
        Err(e) => ParseOutcome {
            feed: salvage(bytes),
            malformed: Some(e.to_string()),
        },
    }
}

/// Parses a feed timestamp in either RFC 2822 (RSS) or RFC 3339 (Atom) form.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Recovery scanner
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
}

impl Field {
    fn from_tag(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" | b"published" | b"issued" | b"date" => Some(Field::Published),
            b"updated" | b"modified" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    title: Option<String>,
    link: Option<String>,
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl PartialEntry {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.link.is_none()
            && self.published.is_none()
            && self.updated.is_none()
    }

    fn finish(self) -> RawEntry {
        RawEntry {
            title: self.title,
            link: self.link,
            published: self.published.or(self.updated),
        }
    }

    fn set(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => {
                if self.title.is_none() {
                    self.title = clean_text(text);
                }
            }
            Field::Link => {
                if self.link.is_none() {
                    self.link = clean_text(text);
                }
            }
            Field::Published => {
                if self.published.is_none() {
                    self.published = parse_timestamp(text);
                }
            }
            Field::Updated => {
                if self.updated.is_none() {
                    self.updated = parse_timestamp(text);
                }
            }
        }
    }
}

/// Walks the document with end-name checking disabled and keeps every
/// field it can read. Stops at the first error the reader cannot skip.
fn salvage(bytes: &[u8]) -> ParsedFeed {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut feed_title: Option<String> = None;
    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        if let Some(partial) = current.take() {
                            if !partial.is_empty() {
                                entries.push(partial.finish());
                            }
                        }
                        current = Some(PartialEntry::default());
                        field = None;
                    }
                    other => {
                        field = Field::from_tag(other);
                        text.clear();
                        if field == Some(Field::Link) {
                            if let (Some(entry), Some(href)) = (current.as_mut(), link_href(&e)) {
                                entry.set(Field::Link, &href);
                            }
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let (Some(entry), Some(href)) = (current.as_mut(), link_href(&e)) {
                        entry.set(Field::Link, &href);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    match e.unescape() {
                        Ok(s) => text.push_str(&s),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        if let Some(partial) = current.take() {
                            if !partial.is_empty() {
                                entries.push(partial.finish());
                            }
                        }
                    }
                    other => {
                        if let Some(f) = field.take() {
                            if Field::from_tag(other) == Some(f) {
                                match current.as_mut() {
                                    Some(entry) => entry.set(f, &text),
                                    None if f == Field::Title && feed_title.is_none() => {
                                        feed_title = clean_text(&text);
                                    }
                                    None => {}
                                }
                            }
                        }
                        text.clear();
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    "Recovery scan stopped at unreadable markup"
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(partial) = current {
        if !partial.is_empty() {
            entries.push(partial.finish());
        }
    }

    ParsedFeed {
        title: feed_title,
        entries,
    }
}

/// Picks the `href` of an Atom-style link, skipping non-alternate relations.
fn link_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut rel = None;

    for attr in e.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }

    match rel.as_deref() {
        None | Some("alternate") => href,
        Some(_) => None,
    }
}
