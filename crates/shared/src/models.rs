use serde::{Deserialize, Serialize};

/// A syndicated feed being polled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub category: String,
    pub active: bool,
    /// RFC 3339, empty until the first successful poll
    pub last_updated: String,
}

/// A stored article with its generated digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub summary: String,
    pub author: String,
    /// RFC 3339 publication date when the feed provided one
    pub published: String,
    pub source_id: i64,
    /// Comma-separated feed category terms
    pub tags: String,
    pub read: bool,
}

/// Article fields as collected from a feed, before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub description: String,
    pub summary: String,
    pub author: String,
    pub published: String,
    pub source_id: i64,
    pub tags: String,
}
