use crate::content::{ContentSource, ListQuery, SourceError};
use crate::models::raw_items::RawItem;
use crate::models::{ContentItem, ListFilter};
use futures_util::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_FEATURED_COUNT: usize = 3;

/// A listing plus where it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub items: Vec<ContentItem>,
    /// Name of the source that answered, `None` when every source failed.
    pub served_by: Option<String>,
    /// Items the answering source returned, before search/limit filtering.
    pub fetched: usize,
}

/// Outcome of probing one source directly, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub ok: bool,
    pub item_count: usize,
    pub elapsed_ms: u128,
    pub error: Option<String>,
}

pub struct ContentPipeline {
    sources: Vec<Arc<dyn ContentSource>>,
}

impl ContentPipeline {
    /// Sources are tried in the order given.
    pub fn new(sources: Vec<Arc<dyn ContentSource>>) -> Self {
        ContentPipeline { sources }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn list_items(&self, filter: &ListFilter) -> Vec<ContentItem> {
        self.list_listing(filter).await.items
    }

    pub async fn featured_items(&self, limit: usize) -> Vec<ContentItem> {
        self.list_items(&ListFilter::default().limit(limit)).await
    }

    /// The first source that answers decides the listing, even if it answers
    /// with nothing.
    pub async fn list_listing(&self, filter: &ListFilter) -> Listing {
        let query = ListQuery {
            search_text: filter.effective_search().map(str::to_string),
            per_page: filter.max_count,
        };

        for source in &self.sources {
            match attempt(source.as_ref(), source.fetch_listing(&query)).await {
                Ok(raw_items) => {
                    let items: Vec<ContentItem> =
                        raw_items.into_iter().map(RawItem::normalize).collect();
                    let fetched = items.len();
                    log::debug!("Source '{}' returned {} item(s)", source.name(), fetched);
                    return Listing {
                        items: apply_filter(items, filter),
                        served_by: Some(source.name().to_string()),
                        fetched,
                    };
                }
                Err(e) => {
                    log::debug!("Source '{}' failed, trying next: {}", source.name(), e);
                }
            }
        }

        log::info!("No content source answered; serving an empty listing");
        Listing::default()
    }

    pub async fn get_item_by_slug(&self, slug: &str) -> Option<ContentItem> {
        let slug = slug.trim();
        if slug.is_empty() {
            return None;
        }

        for source in &self.sources {
            match attempt(source.as_ref(), source.fetch_by_slug(slug)).await {
                Ok(Some(raw)) => return Some(raw.normalize()),
                Ok(None) => log::debug!("Source '{}' has no post '{}'", source.name(), slug),
                Err(e) => log::debug!("Source '{}' failed for '{}': {}", source.name(), slug, e),
            }
        }
        None
    }

    /// Asks every source for a listing, without falling back, and reports
    /// how each one did.
    pub async fn probe(&self) -> Vec<SourceReport> {
        let mut reports = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let started = Instant::now();
            let outcome = attempt(source.as_ref(), source.fetch_listing(&ListQuery::default())).await;
            let elapsed_ms = started.elapsed().as_millis();
            reports.push(match outcome {
                Ok(items) => SourceReport {
                    source: source.name().to_string(),
                    ok: true,
                    item_count: items.len(),
                    elapsed_ms,
                    error: None,
                },
                Err(e) => SourceReport {
                    source: source.name().to_string(),
                    ok: false,
                    item_count: 0,
                    elapsed_ms,
                    error: Some(e.to_string()),
                },
            });
        }
        reports
    }
}

/// Runs one source call under the source's deadline. Panics inside the call
/// are caught and reported like any other failure.
async fn attempt<T, F>(source: &dyn ContentSource, call: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let limit: Duration = source.timeout();
    match tokio::time::timeout(limit, AssertUnwindSafe(call).catch_unwind()).await {
        Err(_) => Err(SourceError::Timeout(limit)),
        Ok(Err(_)) => Err(SourceError::Panicked),
        Ok(Ok(result)) => result,
    }
}

/// Case-insensitive substring match over title and excerpt, then truncation.
/// Blank search text matches everything.
pub fn apply_filter(items: Vec<ContentItem>, filter: &ListFilter) -> Vec<ContentItem> {
    let needle = filter.effective_search().map(str::to_lowercase);
    let matching = items.into_iter().filter(|item| match &needle {
        Some(needle) => {
            item.title.to_lowercase().contains(needle.as_str())
                || item.excerpt.to_lowercase().contains(needle.as_str())
        }
        None => true,
    });
    match filter.max_count {
        Some(max) => matching.take(max).collect(),
        None => matching.collect(),
    }
}
