use crate::helper::sanitization_helpers::{
    clean_excerpt, clean_text, create_excerpt, estimated_reading_minutes, extract_featured_image,
    sanitize_body_html, slugify, strip_all_html, EXCERPT_MAX_CHARS,
};
use crate::models::{ContentId, ContentItem};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddedAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddedMedia {
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddedTerm {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Embedded {
    #[serde(default)]
    pub author: Vec<EmbeddedAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<EmbeddedMedia>,
    #[serde(rename = "wp:term", default)]
    pub terms: Vec<Vec<EmbeddedTerm>>,
}

/// A post exactly as the structured REST API returns it (`_embed=true`).
#[derive(Debug, Deserialize, Clone)]
pub struct RawStructuredItem {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_gmt: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
}

/// One `<item>` of an RSS feed after XML parsing, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub position: usize,
    pub title: String,
    pub link: String,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub content_encoded: Option<String>,
    pub pub_date: Option<String>,
    pub creator: Option<String>,
    pub categories: Vec<String>,
}

/// Source-specific item, converted to [`ContentItem`] at the adapter boundary.
#[derive(Debug, Clone)]
pub enum RawItem {
    Structured(RawStructuredItem),
    Feed(RawFeedItem),
}

pub const DEFAULT_FEED_AUTHOR: &str = "Amogh Van Services";
pub const DEFAULT_FEED_CATEGORY: &str = "General";

impl RawItem {
    pub fn normalize(self) -> ContentItem {
        match self {
            RawItem::Structured(item) => item.normalize(),
            RawItem::Feed(item) => item.normalize(),
        }
    }

    /// The slug the item will carry once normalized.
    pub fn slug(&self) -> String {
        match self {
            RawItem::Structured(item) => item.slug.clone(),
            RawItem::Feed(item) => item.slug(),
        }
    }
}

impl RawStructuredItem {
    fn normalize(self) -> ContentItem {
        let embedded = self.embedded.unwrap_or_default();
        let author_name = embedded
            .author
            .into_iter()
            .next()
            .and_then(|a| a.name)
            .filter(|n| !n.trim().is_empty());
        let featured_image_url = embedded
            .featured_media
            .into_iter()
            .next()
            .and_then(|m| m.source_url);
        // Categories are the first taxonomy in the embedded term list.
        let categories = embedded
            .terms
            .into_iter()
            .next()
            .map(|terms| terms.into_iter().map(|t| clean_text(&t.name)).collect())
            .unwrap_or_default();

        let published_at = self
            .date_gmt
            .as_deref()
            .and_then(parse_naive_utc)
            .or_else(|| self.date.as_deref().and_then(parse_naive_utc));

        ContentItem {
            id: ContentId::Numeric(self.id),
            slug: self.slug,
            title: strip_all_html(&self.title.rendered),
            excerpt: clean_excerpt(&self.excerpt.rendered),
            estimated_reading_minutes: estimated_reading_minutes(&self.content.rendered),
            body_html: sanitize_body_html(&self.content.rendered),
            published_at,
            author_name,
            categories,
            featured_image_url,
            link: self.link,
        }
    }
}

impl RawFeedItem {
    pub fn slug(&self) -> String {
        match slug_from_link(&self.link) {
            Some(slug) => slug,
            None => slugify(&clean_text(&self.title)),
        }
    }

    fn normalize(self) -> ContentItem {
        let slug = self.slug();
        let body = self
            .content_encoded
            .filter(|c| !c.trim().is_empty())
            .or(self.description)
            .unwrap_or_default();

        let title = clean_text(&self.title);

        let categories: Vec<String> = self
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty() && !c.contains("http"))
            .map(clean_text)
            .collect();

        let author_name = self
            .creator
            .map(|c| clean_text(&c))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_FEED_AUTHOR.to_string());

        ContentItem {
            id: ContentId::Text(format!("post-{}", self.position)),
            slug,
            title,
            excerpt: create_excerpt(&body, EXCERPT_MAX_CHARS),
            estimated_reading_minutes: estimated_reading_minutes(&body),
            featured_image_url: extract_featured_image(&body),
            body_html: sanitize_body_html(&body),
            published_at: self
                .pub_date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
                .map(|d| d.with_timezone(&Utc)),
            author_name: Some(author_name),
            categories: if categories.is_empty() {
                vec![DEFAULT_FEED_CATEGORY.to_string()]
            } else {
                categories
            },
            link: Some(self.link).filter(|l| !l.is_empty()),
        }
    }
}

/// Last non-empty path segment of a post link, e.g. `.../2025/08/02/my-post/` -> `my-post`.
pub fn slug_from_link(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let last_segment = match url::Url::parse(link) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string)),
        Err(_) => link.split('/').filter(|s| !s.is_empty()).last().map(str::to_string),
    };
    last_segment.filter(|s| !s.is_empty())
}

/// REST dates come without an offset (`2025-08-02T00:00:00`); `date_gmt` is UTC.
fn parse_naive_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
