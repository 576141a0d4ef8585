use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Per-source cap on how many entries are processed per poll.
const MAX_ENTRIES_PER_FEED: usize = 10;

/// One item parsed out of an RSS or Atom feed.
#[derive(Debug, Clone, Default)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub published: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

pub struct FeedClient {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; GamedevFeeds/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(5));

        Ok(Self { client, semaphore })
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let _permit = self.semaphore.acquire().await?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Feed {} returned HTTP {}", url, status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read feed body")?;

        parse_feed(&body).with_context(|| format!("Failed to parse feed {}", url))
    }

    /// Fetch every feed URL concurrently, keeping per-feed failures isolated.
    pub async fn fetch_feeds_parallel(
        &self,
        urls: Vec<String>,
    ) -> Vec<(String, Result<Vec<FeedEntry>>)> {
        stream::iter(urls)
            .map(|url| {
                let url_clone = url.clone();
                async move {
                    let entries = self.fetch_feed(&url).await;
                    (url_clone, entries)
                }
            })
            .buffer_unordered(5)
            .collect()
            .await
    }
}

/// Parse an RSS 2.0 or Atom document into feed entries. Only the elements
/// the pipeline needs are read; unknown markup is skipped.
///
/// Open fields are tracked as a (name, depth) stack so text nested inside
/// inline markup, like Atom xhtml summaries, still accumulates into the
/// enclosing field instead of being dropped at the first child element.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries: Vec<FeedEntry> = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut fields: Vec<(String, usize)> = Vec::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = local_name(e.name().as_ref());
                match name.as_str() {
                    "item" | "entry" => current = Some(FeedEntry::default()),
                    "link" | "category" => read_attributes(e, name == "link", current.as_mut()),
                    _ => {}
                }
                if let Some(entry) = current.as_mut() {
                    if open_field(entry, &name) {
                        if name == "category" {
                            entry.tags.push(String::new());
                        }
                        fields.push((name, depth));
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e.name().as_ref());
                if name == "link" || name == "category" {
                    read_attributes(e, name == "link", current.as_mut());
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|err| anyhow::anyhow!("XML decode error: {}", err))?;
                if let (Some(entry), Some((field, _))) = (current.as_mut(), fields.last()) {
                    append_text(entry, field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                if let (Some(entry), Some((field, _))) = (current.as_mut(), fields.last()) {
                    append_text(entry, field, &text);
                }
            }
            Ok(Event::End(ref e)) => {
                if fields.last().is_some_and(|(_, d)| *d == depth) {
                    fields.pop();
                }
                depth = depth.saturating_sub(1);
                let name = local_name(e.name().as_ref());
                if name == "item" || name == "entry" {
                    if let Some(mut entry) = current.take() {
                        entry.tags.retain(|tag| !tag.is_empty());
                        if !entry.link.is_empty() {
                            entries.push(entry);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("Malformed feed XML: {}", e),
            _ => {}
        }
        buf.clear();
    }

    entries.truncate(MAX_ENTRIES_PER_FEED);
    Ok(entries)
}

/// Element name with any namespace prefix stripped (`dc:creator` → `creator`).
fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    name.rsplit(':').next().unwrap_or_default().to_string()
}

/// Atom carries links and category terms in attributes rather than text.
fn read_attributes(e: &BytesStart, is_link: bool, current: Option<&mut FeedEntry>) {
    let Some(entry) = current else {
        return;
    };
    for attr in e.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(value) => value.to_string(),
            Err(_) => continue,
        };
        if is_link && attr.key.as_ref() == b"href" && entry.link.is_empty() {
            entry.link = value;
        } else if !is_link && attr.key.as_ref() == b"term" {
            entry.tags.push(value);
        }
    }
}

/// Whether an opening element starts a text field worth tracking. The first
/// occurrence of a scalar field wins; later duplicates are not tracked.
/// "email" and "uri" are tracked so their text never bleeds into an
/// enclosing Atom <author>.
fn open_field(entry: &FeedEntry, name: &str) -> bool {
    match name {
        "title" => entry.title.is_empty(),
        "link" => entry.link.is_empty(),
        "description" | "summary" => entry.description.is_empty(),
        // RSS <author>, dc:creator, or the <name> inside an Atom <author>.
        "author" | "creator" | "name" => entry.author.is_empty(),
        "pubDate" | "published" | "updated" => entry.published.is_none(),
        "category" | "email" | "uri" => true,
        _ => false,
    }
}

fn append_text(entry: &mut FeedEntry, field: &str, text: &str) {
    match field {
        "title" => push_joined(&mut entry.title, text),
        "link" => entry.link.push_str(text),
        "description" | "summary" => push_joined(&mut entry.description, text),
        "author" | "creator" | "name" => push_joined(&mut entry.author, text),
        "pubDate" | "published" | "updated" => {
            if entry.published.is_none() {
                entry.published = parse_date(text);
            }
        }
        "category" => {
            if let Some(tag) = entry.tags.last_mut() {
                push_joined(tag, text);
            }
        }
        _ => {}
    }
}

/// Successive text chunks of one field are space-separated; the reader
/// trims each chunk, so joining bare would glue words together.
fn push_joined(slot: &mut String, text: &str) {
    if !slot.is_empty() {
        slot.push(' ');
    }
    slot.push_str(text);
}

/// RSS uses RFC 2822 dates, Atom uses RFC 3339. Unparseable dates are
/// dropped rather than failing the whole feed.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(text.trim()) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text.trim()) {
        return Some(date.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Engine Blog</title>
    <link>https://example.com</link>
    <item>
      <title>Shader pipeline rewrite</title>
      <link>https://example.com/posts/1</link>
      <description><![CDATA[<p>A new <b>shader</b> pipeline.</p>]]></description>
      <dc:creator>Ada</dc:creator>
      <pubDate>Tue, 03 Jun 2025 09:30:00 +0000</pubDate>
      <category>graphics</category>
      <category>engine</category>
    </item>
    <item>
      <title>No link, skipped</title>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Physics Weekly</title>
  <entry>
    <title>Rigidbody solver update</title>
    <link href="https://example.com/atom/1"/>
    <summary>Constraint solving got faster.</summary>
    <author><name>Grace</name></author>
    <updated>2025-06-03T09:30:00Z</updated>
    <category term="physics"/>
  </entry>
</feed>"#;

    // ==================== RSS Tests ====================

    #[test]
    fn test_parse_rss_item() {
        let entries = parse_feed(RSS_SAMPLE).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.title, "Shader pipeline rewrite");
        assert_eq!(entry.link, "https://example.com/posts/1");
        assert!(entry.description.contains("shader"));
        assert_eq!(entry.author, "Ada");
        assert!(entry.published.is_some());
        assert_eq!(entry.tags, vec!["graphics", "engine"]);
    }

    #[test]
    fn test_channel_title_not_mistaken_for_item_title() {
        let entries = parse_feed(RSS_SAMPLE).unwrap();
        assert_ne!(entries[0].title, "Engine Blog");
    }

    // ==================== Atom Tests ====================

    #[test]
    fn test_parse_atom_entry() {
        let entries = parse_feed(ATOM_SAMPLE).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.title, "Rigidbody solver update");
        assert_eq!(entry.link, "https://example.com/atom/1");
        assert_eq!(entry.description, "Constraint solving got faster.");
        assert_eq!(entry.author, "Grace");
        assert!(entry.published.is_some());
        assert_eq!(entry.tags, vec!["physics"]);
    }

    #[test]
    fn test_atom_xhtml_summary_keeps_text_after_inline_markup() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Mixed content</title>
    <link href="https://example.com/atom/2"/>
    <summary type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Constraint solving got <b>much</b> faster this release.</div></summary>
  </entry>
</feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(
            entries[0].description,
            "Constraint solving got much faster this release."
        );
    }

    #[test]
    fn test_atom_author_email_not_mixed_into_name() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>With email</title>
    <link href="https://example.com/atom/3"/>
    <author><name>Grace</name><email>grace@example.com</email></author>
  </entry>
</feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].author, "Grace");
    }

    #[test]
    fn test_first_scalar_field_wins() {
        let xml = "<rss><channel><item>\
                   <title>Real title</title><title>Duplicate</title>\
                   <link>https://example.com/1</link>\
                   </item></channel></rss>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].title, "Real title");
    }

    // ==================== Limits and Edge Cases ====================

    #[test]
    fn test_entry_cap() {
        let items: String = (0..15)
            .map(|i| {
                format!(
                    "<item><title>t{}</title><link>https://example.com/{}</link></item>",
                    i, i
                )
            })
            .collect();
        let xml = format!("<rss><channel>{}</channel></rss>", items);
        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn test_empty_feed() {
        let entries = parse_feed("<rss><channel></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("Tue, 03 Jun 2025 09:30:00 +0000").is_some());
        assert!(parse_date("2025-06-03T09:30:00Z").is_some());
        assert!(parse_date("yesterday-ish").is_none());
    }
}
