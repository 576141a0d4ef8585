// Public modules
pub mod analyzer;
pub mod config;
pub mod digest;
pub mod extractor;
pub mod feeds;
pub mod lexicon;
pub mod models;
pub mod segmenter;
pub mod simplifier;
pub mod store;

// Re-export commonly used types
pub use analyzer::{analyze, Role, SentenceRecord};
pub use config::Config;
pub use digest::{generate_summary, EMPTY_SUMMARY, FAILED_SUMMARY};
pub use extractor::{strip_html, ContentExtractor};
pub use feeds::{FeedClient, FeedEntry};
pub use lexicon::Lexicon;
pub use models::{Article, FeedSource, NewArticle};
pub use segmenter::segment;
pub use simplifier::simplify;
pub use store::{ArticleFilter, Store};
