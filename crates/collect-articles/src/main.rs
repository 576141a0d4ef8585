use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    feeds::FeedEntry, generate_summary, strip_html, Config, ContentExtractor, FeedClient,
    FeedSource, Lexicon, NewArticle, Store,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "collect-articles")]
#[command(about = "Poll game-dev feeds, summarize new articles, and store them")]
struct Args {
    /// Database file (defaults to the local data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Abort the whole fetch cycle after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Only poll sources in this category
    #[arg(short, long)]
    category: Option<String>,

    /// Also fetch full article bodies for summarization
    #[arg(long)]
    full_content: bool,

    /// Seed the default feed list before collecting
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    let db_path = match args.db.or(config.db_path) {
        Some(path) => path,
        None => Store::default_path()?,
    };
    let store = Store::open(&db_path)?;

    if args.seed {
        let added = store.seed_default_sources()?;
        if added > 0 {
            println!("✓ Seeded {} default sources", added);
        }
    }

    let sources: Vec<FeedSource> = store
        .list_sources()?
        .into_iter()
        .filter(|source| source.active)
        .filter(|source| match &args.category {
            Some(category) => &source.category == category,
            None => true,
        })
        .collect();

    if sources.is_empty() {
        println!("No active sources to poll. Run with --seed to install the defaults.");
        return Ok(());
    }

    println!("📡 Polling {} feed sources...", sources.len());

    let timeout_secs = args.timeout.unwrap_or(config.fetch_timeout_secs);
    let client = FeedClient::new()?;
    let extractor = ContentExtractor::new()?;
    let urls: Vec<String> = sources.iter().map(|source| source.url.clone()).collect();

    // The whole network phase runs under one wall-clock bound; on expiry
    // the batch is aborted rather than any single fetch.
    let fetch_cycle = async {
        let feed_results = client.fetch_feeds_parallel(urls).await;

        let bodies: HashMap<String, String> = if args.full_content {
            let links: Vec<String> = feed_results
                .iter()
                .filter_map(|(_, entries)| entries.as_ref().ok())
                .flatten()
                .map(|entry| entry.link.clone())
                .collect();
            extractor
                .fetch_articles_parallel(links)
                .await
                .into_iter()
                .filter_map(|(url, content)| content.map(|c| (url, c)))
                .collect()
        } else {
            HashMap::new()
        };

        (feed_results, bodies)
    };

    let (feed_results, bodies) = tokio::time::timeout(Duration::from_secs(timeout_secs), fetch_cycle)
        .await
        .map_err(|_| anyhow::anyhow!("Fetch cycle timed out after {}s, batch aborted", timeout_secs))?;

    let results_by_url: HashMap<String, Result<Vec<FeedEntry>>> = feed_results.into_iter().collect();

    let lexicon = Lexicon::default();
    let mut total_new = 0;
    let mut failed_sources = 0;

    for source in &sources {
        let entries = match results_by_url.get(&source.url) {
            Some(Ok(entries)) => entries,
            Some(Err(e)) => {
                eprintln!("⚠ {}: {}", source.name, e);
                failed_sources += 1;
                continue;
            }
            None => continue,
        };

        let mut new_here = 0;
        for entry in entries {
            if entry.link.is_empty() || store.article_exists(&entry.link)? {
                continue;
            }

            let description = strip_html(&entry.description);
            let content = bodies.get(&entry.link).map(String::as_str).unwrap_or("");
            let summary = generate_summary(&lexicon, &entry.title, &description, content);

            store
                .insert_article(&NewArticle {
                    title: entry.title.clone(),
                    url: entry.link.clone(),
                    description,
                    summary,
                    author: entry.author.clone(),
                    published: entry
                        .published
                        .map(|date| date.to_rfc3339())
                        .unwrap_or_default(),
                    source_id: source.id,
                    tags: entry.tags.join(","),
                })
                .with_context(|| format!("Failed to store article {}", entry.link))?;
            new_here += 1;
        }

        store.touch_source(source.id)?;
        if new_here > 0 {
            println!("✓ {}: {} new articles", source.name, new_here);
        }
        total_new += new_here;
    }

    println!(
        "\n✅ Collection finished: {} new articles from {}/{} sources",
        total_new,
        sources.len() - failed_sources,
        sources.len()
    );

    Ok(())
}
