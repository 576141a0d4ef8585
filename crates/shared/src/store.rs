use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Article, FeedSource, NewArticle};

/// Feeds seeded into an empty database, name / url / category.
const DEFAULT_SOURCES: &[(&str, &str, &str)] = &[
    // Engines
    (
        "Unreal Engine Blog",
        "https://www.unrealengine.com/en-US/feed",
        "unreal_engine",
    ),
    ("Unity Blog", "https://blog.unity.com/feed", "unity"),
    (
        "Godot Engine News",
        "https://godotengine.org/rss.xml",
        "game_engines",
    ),
    // General game development
    (
        "Game Developer (Gamasutra)",
        "https://www.gamedeveloper.com/rss.xml",
        "game_development",
    ),
    (
        "Indie Game Developer",
        "https://www.indiegamedev.net/feed/",
        "indie_development",
    ),
    // Graphics and rendering
    (
        "Real-Time Rendering",
        "http://www.realtimerendering.com/blog/feed/",
        "graphics_programming",
    ),
    (
        "Graphics Programming Weekly",
        "https://www.jendrikillner.com/tags/weekly/index.xml",
        "graphics_programming",
    ),
    (
        "Advances in Real-Time Rendering",
        "http://advances.realtimerendering.com/feed/",
        "graphics_programming",
    ),
    // Physics
    (
        "Bullet Physics",
        "https://pybullet.org/wordpress/feed/",
        "physics_simulation",
    ),
    (
        "NVIDIA PhysX",
        "https://developer.nvidia.com/rss.xml",
        "physics_simulation",
    ),
    // Animation
    (
        "Animation Mentor Blog",
        "https://www.animationmentor.com/blog/feed/",
        "animation",
    ),
    (
        "Blender News",
        "https://www.blender.org/news/rss/",
        "animation",
    ),
    // Engine architecture
    (
        "Game Engine Architecture",
        "https://www.gameenginebook.com/feed/",
        "engine_architecture",
    ),
    (
        "Molecular Musings",
        "https://blog.molecular-matters.com/feed/",
        "engine_architecture",
    ),
    // AI and machine learning
    (
        "Unity ML-Agents",
        "https://blogs.unity3d.com/category/machine-learning/feed/",
        "ai_ml",
    ),
    ("Game AI Pro", "http://www.gameaipro.com/feed/", "ai_ml"),
    // Performance
    (
        "Intel Game Dev",
        "https://www.intel.com/content/www/us/en/developer/topic-technology/gamedev/rss.xml",
        "performance",
    ),
    ("AMD GPUOpen", "https://gpuopen.com/feed/", "performance"),
    // VR / AR
    (
        "Oculus Developer Blog",
        "https://developer.oculus.com/blog/rss/",
        "vr_ar",
    ),
    (
        "Unity XR",
        "https://blogs.unity3d.com/category/xr/feed/",
        "vr_ar",
    ),
    // Individual technical blogs
    (
        "Inigo Quilez",
        "https://iquilezles.org/articles/rss.xml",
        "technical_blogs",
    ),
    (
        "Fabien Sanglard",
        "https://fabiensanglard.net/rss.xml",
        "technical_blogs",
    ),
    (
        "Aras Pranckevičius",
        "https://aras-p.info/blog/feed/",
        "technical_blogs",
    ),
];

/// Oversized feed fields are cut down before storage.
const MAX_TITLE_CHARS: usize = 500;
const MAX_AUTHOR_CHARS: usize = 100;
const MAX_TAGS_CHARS: usize = 500;

/// Optional constraints for listing articles.
#[derive(Debug, Default, Clone)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub unread_only: bool,
    pub limit: usize,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Database under the local data directory, used unless overridden.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not determine local data directory")?
            .join("gamedev-feeds");
        Ok(dir.join("articles.db"))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sources (
                     id INTEGER PRIMARY KEY,
                     name TEXT NOT NULL,
                     url TEXT NOT NULL UNIQUE,
                     category TEXT NOT NULL DEFAULT 'general',
                     active INTEGER NOT NULL DEFAULT 1,
                     last_updated TEXT NOT NULL DEFAULT '',
                     created_at TEXT NOT NULL
                 );
                 CREATE TABLE IF NOT EXISTS articles (
                     id INTEGER PRIMARY KEY,
                     title TEXT NOT NULL,
                     url TEXT NOT NULL UNIQUE,
                     description TEXT NOT NULL DEFAULT '',
                     summary TEXT NOT NULL DEFAULT '',
                     author TEXT NOT NULL DEFAULT '',
                     published TEXT NOT NULL DEFAULT '',
                     source_id INTEGER NOT NULL REFERENCES sources(id),
                     tags TEXT NOT NULL DEFAULT '',
                     read INTEGER NOT NULL DEFAULT 0,
                     created_at TEXT NOT NULL
                 );",
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    // ==================== Sources ====================

    /// Insert the default feed list, skipping URLs already present.
    pub fn seed_default_sources(&self) -> Result<usize> {
        let mut added = 0;
        for (name, url, category) in DEFAULT_SOURCES {
            let inserted = self.conn.execute(
                "INSERT OR IGNORE INTO sources (name, url, category, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, url, category, Utc::now().to_rfc3339()],
            )?;
            added += inserted;
        }
        Ok(added)
    }

    pub fn add_source(&self, name: &str, url: &str, category: &str) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM sources WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        if existing.is_some() {
            anyhow::bail!("A source with URL {} already exists", url);
        }

        self.conn.execute(
            "INSERT INTO sources (name, url, category, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, url, category, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_sources(&self) -> Result<Vec<FeedSource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, category, active, last_updated FROM sources ORDER BY id",
        )?;
        let sources = stmt
            .query_map([], source_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sources)
    }

    /// Flip a source's active flag, returning the new state.
    pub fn toggle_source(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE sources SET active = 1 - active WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            anyhow::bail!("No source with id {}", id);
        }
        let active: bool =
            self.conn
                .query_row("SELECT active FROM sources WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })?;
        Ok(active)
    }

    /// Remove a source along with every article collected from it.
    pub fn remove_source(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM articles WHERE source_id = ?1", params![id])?;
        let removed = self
            .conn
            .execute("DELETE FROM sources WHERE id = ?1", params![id])?;
        if removed == 0 {
            anyhow::bail!("No source with id {}", id);
        }
        Ok(())
    }

    pub fn touch_source(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sources SET last_updated = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    // ==================== Articles ====================

    pub fn article_exists(&self, url: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM articles WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub fn insert_article(&self, article: &NewArticle) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO articles
                 (title, url, description, summary, author, published, source_id, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                capped(&article.title, MAX_TITLE_CHARS),
                article.url,
                article.description,
                article.summary,
                capped(&article.author, MAX_AUTHOR_CHARS),
                article.published,
                article.source_id,
                capped(&article.tags, MAX_TAGS_CHARS),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_article(&self, id: i64) -> Result<Article> {
        self.conn
            .query_row(
                "SELECT id, title, url, description, summary, author, published, source_id, tags, read
                 FROM articles WHERE id = ?1",
                params![id],
                article_from_row,
            )
            .optional()?
            .with_context(|| format!("No article with id {}", id))
    }

    pub fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let mut sql = String::from(
            "SELECT a.id, a.title, a.url, a.description, a.summary, a.author, a.published,
                    a.source_id, a.tags, a.read
             FROM articles a JOIN sources s ON s.id = a.source_id WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some(category) = &filter.category {
            sql.push_str(" AND s.category = ?");
            args.push(category.clone());
        }
        if let Some(search) = &filter.search {
            sql.push_str(" AND (a.title LIKE ? OR a.description LIKE ? OR a.tags LIKE ?)");
            let needle = format!("%{}%", search);
            args.push(needle.clone());
            args.push(needle.clone());
            args.push(needle);
        }
        if filter.unread_only {
            sql.push_str(" AND a.read = 0");
        }
        sql.push_str(" ORDER BY a.published DESC, a.id DESC");
        if filter.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", filter.limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let articles = stmt
            .query_map(params_from_iter(args), article_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(articles)
    }

    pub fn mark_read(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("UPDATE articles SET read = 1 WHERE id = ?1", params![id])?;
        if changed == 0 {
            anyhow::bail!("No article with id {}", id);
        }
        Ok(())
    }

    pub fn mark_all_read(&self) -> Result<usize> {
        Ok(self.conn.execute("UPDATE articles SET read = 1", [])?)
    }

    /// Delete every article and reset all sources to active with no
    /// last-poll timestamp, so the next collection starts fresh.
    pub fn clear_articles(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM articles", [])?;
        self.conn
            .execute("UPDATE sources SET last_updated = '', active = 1", [])?;
        Ok(deleted)
    }

    /// Article counts per source category, for the browse listing.
    pub fn category_counts(&self) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.category, COUNT(a.id)
             FROM sources s JOIN articles a ON a.source_id = s.id
             GROUP BY s.category ORDER BY COUNT(a.id) DESC",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }
}

fn capped(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn source_from_row(row: &Row) -> rusqlite::Result<FeedSource> {
    Ok(FeedSource {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        category: row.get(3)?,
        active: row.get(4)?,
        last_updated: row.get(5)?,
    })
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        summary: row.get(4)?,
        author: row.get(5)?,
        published: row.get(6)?,
        source_id: row.get(7)?,
        tags: row.get(8)?,
        read: row.get(9)?,
    })
}
