//! Read-only post retrieval with ordered source fallback.
//!
//! Sources are tried one at a time in configured order, each under its own
//! deadline. Source failures never reach callers: a listing degrades to an
//! empty list and a slug lookup to `None`.

pub mod fallback_data;
pub mod feed;
pub mod pipeline;
pub mod structured_api;

use crate::models::raw_items::RawItem;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use feed::FeedSource;
pub use pipeline::{ContentPipeline, Listing, SourceReport};
pub use structured_api::StructuredApiSource;

/// Why a single source attempt did not produce items.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Source panicked while fetching")]
    Panicked,
}

/// What a listing request asks a source for. Sources may ignore the search
/// hint; the pipeline filters again after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search_text: Option<String>,
    pub per_page: Option<usize>,
}

/// A place posts can be fetched from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &str;

    /// Deadline for one attempt against this source.
    fn timeout(&self) -> Duration;

    async fn fetch_listing(&self, query: &ListQuery) -> Result<Vec<RawItem>, SourceError>;

    /// Looks a single post up by slug. `Ok(None)` means the source answered
    /// but has no such post. The default scans the full listing.
    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<RawItem>, SourceError> {
        let items = self.fetch_listing(&ListQuery::default()).await?;
        Ok(items.into_iter().find(|item| item.slug() == slug))
    }
}
