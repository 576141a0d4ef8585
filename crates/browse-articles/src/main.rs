use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{Article, ArticleFilter, Config, Store};
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(name = "browse-articles")]
#[command(about = "Browse collected articles and manage feed sources")]
struct Args {
    /// Database file (defaults to the local data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored articles
    List {
        /// Only articles from sources in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Substring match on title, description, or tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only unread articles
        #[arg(short, long)]
        unread: bool,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// Emit the matching articles as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Show one article with its digest, marking it read
    Show { id: i64 },

    /// List feed sources
    Sources,

    /// Add a feed source
    AddSource {
        name: String,
        url: String,
        #[arg(short, long, default_value = "general")]
        category: String,
    },

    /// Remove a feed source and its articles
    RemoveSource { id: i64 },

    /// Toggle a source active or inactive
    ToggleSource { id: i64 },

    /// Mark every article read
    MarkAllRead,

    /// Delete all stored articles and reset sources
    Clear,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    let db_path = match args.db.or(config.db_path) {
        Some(path) => path,
        None => Store::default_path()?,
    };
    let store = Store::open(&db_path)?;

    match args.command {
        Command::List {
            category,
            search,
            unread,
            limit,
            json,
        } => {
            let articles = store.list_articles(&ArticleFilter {
                category,
                search,
                unread_only: unread,
                limit,
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
                return Ok(());
            }

            if articles.is_empty() {
                println!("No matching articles.");
                return Ok(());
            }

            for article in &articles {
                print_listing_line(article);
            }

            let counts = store.category_counts()?;
            if !counts.is_empty() {
                let rendered: Vec<String> = counts
                    .iter()
                    .map(|(category, count)| format!("{} ({})", category, count))
                    .collect();
                println!("\nCategories: {}", rendered.join(", "));
            }
        }

        Command::Show { id } => {
            let article = store.get_article(id)?;
            store.mark_read(id)?;

            println!("{}", article.title);
            println!("{}", article.url);
            if !article.author.is_empty() {
                println!("Author: {}", article.author);
            }
            if !article.published.is_empty() {
                println!("Published: {}", article.published);
            }
            if !article.tags.is_empty() {
                println!("Tags: {}", article.tags);
            }
            if !article.description.is_empty() {
                println!("\n{}", article.description);
            }
            if !article.summary.is_empty() {
                println!("\n{}", article.summary);
            }
        }

        Command::Sources => {
            let sources = store.list_sources()?;
            if sources.is_empty() {
                println!("No sources configured. Run collect-articles --seed to install the defaults.");
                return Ok(());
            }
            for source in &sources {
                let state = if source.active { "✓" } else { "✗" };
                println!(
                    "{} [{}] {} ({}) {}",
                    state, source.id, source.name, source.category, source.url
                );
            }
        }

        Command::AddSource {
            name,
            url,
            category,
        } => {
            Url::parse(&url).with_context(|| format!("Invalid feed URL: {}", url))?;
            let id = store.add_source(&name, &url, &category)?;
            println!("✓ Added source [{}] {}", id, name);
        }

        Command::RemoveSource { id } => {
            store.remove_source(id)?;
            println!("✓ Removed source [{}] and its articles", id);
        }

        Command::ToggleSource { id } => {
            let active = store.toggle_source(id)?;
            println!(
                "✓ Source [{}] is now {}",
                id,
                if active { "active" } else { "inactive" }
            );
        }

        Command::MarkAllRead => {
            let count = store.mark_all_read()?;
            println!("✓ Marked {} articles read", count);
        }

        Command::Clear => {
            let deleted = store.clear_articles()?;
            println!("✓ Cleared {} articles and reset all sources", deleted);
        }
    }

    Ok(())
}

fn print_listing_line(article: &Article) {
    let marker = if article.read { " " } else { "•" };
    let date = article.published.split('T').next().unwrap_or("");
    if date.is_empty() {
        println!("{} [{}] {}", marker, article.id, article.title);
    } else {
        println!("{} [{}] {} ({})", marker, article.id, article.title, date);
    }
}
