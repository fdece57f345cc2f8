use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a post as reported by whichever source produced it.
/// The REST API hands out numbers, the feed parser positional strings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ContentId {
    Numeric(u64),
    Text(String),
}

/// Canonical post shape served to the site, whatever source it came from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_html: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author_name: Option<String>,
    pub categories: Vec<String>,
    pub featured_image_url: Option<String>,
    pub estimated_reading_minutes: u32,
    pub link: Option<String>,
}

/// Listing request: optional search text and an optional cap on the result count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search_text: Option<String>,
    pub max_count: Option<usize>,
}

impl ListFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn limit(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// The search text, or `None` when it is absent or blank.
    pub fn effective_search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// User-facing message attached to a response ('success' or 'error').
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub r#type: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification { message: message.into(), r#type: "success".to_string() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification { message: message.into(), r#type: "error".to_string() }
    }

    pub fn is_error(&self) -> bool {
        self.r#type == "error"
    }
}

pub mod contact_models;
pub mod raw_items;
pub mod registration_models;
