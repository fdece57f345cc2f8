use crate::content::fallback_data::{bundled_post, bundled_posts};
use crate::content::pipeline::apply_filter;
use crate::content::ContentPipeline;
use crate::models::{ContentItem, ListFilter};
use serde::Serialize;

pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const DEFAULT_FEATURED_LIMIT: usize = crate::content::pipeline::DEFAULT_FEATURED_COUNT;

/// Whether posts came from a content source or the bundled set.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Bundled,
}

#[derive(Debug, Serialize)]
pub struct PostListing {
    pub origin: Origin,
    pub posts: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub origin: Origin,
    pub post: ContentItem,
}

/// Live posts when any source produced some, otherwise the bundled set
/// under the same filter.
pub async fn fetch_posts(pipeline: &ContentPipeline, filter: &ListFilter) -> PostListing {
    let listing = pipeline.list_listing(filter).await;
    if listing.fetched > 0 {
        return PostListing { origin: Origin::Live, posts: listing.items };
    }

    log::info!("No live posts available; serving bundled posts");
    PostListing {
        origin: Origin::Bundled,
        posts: apply_filter(bundled_posts().to_vec(), filter),
    }
}

pub async fn fetch_featured_posts(pipeline: &ContentPipeline, limit: usize) -> PostListing {
    fetch_posts(pipeline, &ListFilter::default().limit(limit)).await
}

pub async fn fetch_post_by_slug(pipeline: &ContentPipeline, slug: &str) -> Option<PostDetail> {
    if let Some(post) = pipeline.get_item_by_slug(slug).await {
        return Some(PostDetail { origin: Origin::Live, post });
    }
    bundled_post(slug.trim()).map(|post| PostDetail { origin: Origin::Bundled, post })
}
