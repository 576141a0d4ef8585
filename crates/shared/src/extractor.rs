use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Description text stored alongside an article is capped here.
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Extracted article bodies are capped before summarization.
const MAX_CONTENT_CHARS: usize = 5000;

/// Likely main-content containers, tried in order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article",
    "#article",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".post-body",
    ".article-body",
    "main",
    ".main",
    "#main",
];

pub struct ContentExtractor {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; GamedevFeeds/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(10));

        Ok(Self { client, semaphore })
    }

    /// Fetch an article page and pull out its main text. Auth walls and
    /// missing pages yield `Ok(None)` rather than an error.
    pub async fn fetch_article_content(&self, url: &str) -> Result<Option<String>> {
        let _permit = self.semaphore.acquire().await?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if status == 401 || status == 403 || status == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response.text().await.context("Failed to read response body")?;

        Ok(extract_content(&html))
    }

    pub async fn fetch_articles_parallel(
        &self,
        urls: Vec<String>,
    ) -> Vec<(String, Option<String>)> {
        stream::iter(urls)
            .map(|url| {
                let url_clone = url.clone();
                async move {
                    let content = self.fetch_article_content(&url).await.ok().flatten();
                    (url_clone, content)
                }
            })
            .buffer_unordered(10)
            .collect()
            .await
    }
}

/// Extract the main article text from a full HTML page: the first matching
/// content container wins, otherwise the whole page is converted to text.
pub fn extract_content(html: &str) -> Option<String> {
    {
        let document = Html::parse_document(html);
        for selector in CONTENT_SELECTORS {
            let Ok(parsed) = Selector::parse(selector) else {
                continue;
            };
            if let Some(element) = document.select(&parsed).next() {
                let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Some(truncate_chars(&text, MAX_CONTENT_CHARS));
                }
            }
        }
    }

    let text = collapse_whitespace(&html2text::from_read(html.as_bytes(), 100));
    if text.len() < 100 {
        return None;
    }
    Some(truncate_chars(&text, MAX_CONTENT_CHARS))
}

/// Reduce an HTML fragment (a feed description) to plain text, capped.
pub fn strip_html(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text = collapse_whitespace(&document.root_element().text().collect::<Vec<_>>().join(" "));
    truncate_chars(&text, MAX_DESCRIPTION_CHARS)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== strip_html Tests ====================

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(
            strip_html("<p>A new <b>shader</b> pipeline.</p>"),
            "A new shader pipeline."
        );
    }

    #[test]
    fn test_strip_html_collapses_whitespace() {
        assert_eq!(strip_html("a\n\n   b\t c"), "a b c");
    }

    #[test]
    fn test_strip_html_plain_text_passthrough() {
        assert_eq!(strip_html("already plain"), "already plain");
    }

    #[test]
    fn test_strip_html_caps_length() {
        let fragment = format!("<p>{}</p>", "x".repeat(800));
        assert_eq!(strip_html(&fragment).chars().count(), 500);
    }

    // ==================== extract_content Tests ====================

    #[test]
    fn test_prefers_article_element() {
        let html = "<html><body>\
                    <nav>site navigation links</nav>\
                    <article>The actual article body text.</article>\
                    </body></html>";
        let content = extract_content(html).unwrap();
        assert_eq!(content, "The actual article body text.");
    }

    #[test]
    fn test_selector_priority() {
        let html = "<html><body>\
                    <main>secondary container</main>\
                    <article>primary container</article>\
                    </body></html>";
        let content = extract_content(html).unwrap();
        assert_eq!(content, "primary container");
    }

    #[test]
    fn test_tiny_page_without_containers_yields_none() {
        assert!(extract_content("<html><body><p>hi</p></body></html>").is_none());
    }
}
