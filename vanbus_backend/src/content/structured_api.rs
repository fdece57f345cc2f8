use crate::content::{ContentSource, ListQuery, SourceError};
use crate::models::raw_items::{RawItem, RawStructuredItem};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://kharwaramog02-swayq.wordpress.com/wp-json/wp/v2";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_millis(3000);
const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

/// Source A: a WordPress-style REST API returning JSON posts.
pub struct StructuredApiSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl StructuredApiSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(StructuredApiSource {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    async fn get_posts(&self, params: &[(&str, String)]) -> Result<Vec<RawStructuredItem>, SourceError> {
        let response = self
            .client
            .get(self.posts_url())
            .query(params)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ContentSource for StructuredApiSource {
    fn name(&self) -> &str {
        "structured-api"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_listing(&self, query: &ListQuery) -> Result<Vec<RawItem>, SourceError> {
        let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let mut params = vec![
            ("status", "publish".to_string()),
            ("_embed", "true".to_string()),
            ("per_page", per_page.to_string()),
            ("orderby", "date".to_string()),
            ("order", "desc".to_string()),
        ];
        if let Some(search) = &query.search_text {
            params.push(("search", search.clone()));
        }

        let posts = self.get_posts(&params).await?;
        Ok(posts.into_iter().map(RawItem::Structured).collect())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<RawItem>, SourceError> {
        let params = [("slug", slug.to_string()), ("_embed", "true".to_string())];
        let posts = self.get_posts(&params).await?;
        Ok(posts.into_iter().next().map(RawItem::Structured))
    }
}
