use crate::content::{ContentSource, ListQuery, SourceError};
use crate::models::raw_items::{RawFeedItem, RawItem};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::ACCEPT;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://kharwaramog02-swayq.wordpress.com";
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/raw";
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_millis(5000);

/// Source B: the site's RSS feed, optionally fetched through a relay that
/// takes the feed address as its `url` query parameter.
pub struct FeedSource {
    client: reqwest::Client,
    site_url: String,
    relay_url: Option<String>,
    timeout: Duration,
}

impl FeedSource {
    pub fn new(
        site_url: impl Into<String>,
        relay_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(FeedSource {
            client,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            relay_url: relay_url.filter(|r| !r.trim().is_empty()),
            timeout,
        })
    }

    pub fn feed_url(&self) -> String {
        format!("{}/feed/", self.site_url)
    }

    /// The address actually requested: the relay with the feed URL encoded
    /// into it, or the feed itself.
    pub fn request_url(&self) -> Result<Url, SourceError> {
        let feed_url = self.feed_url();
        let invalid = |e: url::ParseError| SourceError::Parse(format!("Invalid feed address: {}", e));
        match &self.relay_url {
            Some(relay) => {
                let mut url = Url::parse(relay).map_err(invalid)?;
                url.query_pairs_mut().append_pair("url", &feed_url);
                Ok(url)
            }
            None => Url::parse(&feed_url).map_err(invalid),
        }
    }
}

#[async_trait]
impl ContentSource for FeedSource {
    fn name(&self) -> &str {
        "feed"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The feed has no server-side search or paging; the pipeline filters.
    async fn fetch_listing(&self, _query: &ListQuery) -> Result<Vec<RawItem>, SourceError> {
        let response = self
            .client
            .get(self.request_url()?)
            .header(ACCEPT, "application/rss+xml, application/xml, text/xml")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let items = parse_feed(&body)?;
        Ok(items.into_iter().map(RawItem::Feed).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Link,
    Guid,
    Description,
    ContentEncoded,
    PubDate,
    Creator,
    Category,
}

impl ItemField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(ItemField::Title),
            b"link" => Some(ItemField::Link),
            b"guid" => Some(ItemField::Guid),
            b"description" => Some(ItemField::Description),
            b"content:encoded" | b"encoded" => Some(ItemField::ContentEncoded),
            b"pubDate" => Some(ItemField::PubDate),
            b"dc:creator" | b"creator" => Some(ItemField::Creator),
            b"category" => Some(ItemField::Category),
            _ => None,
        }
    }

    fn store(self, item: &mut RawFeedItem, text: &str) {
        let value = text.trim().to_string();
        match self {
            ItemField::Title => item.title = value,
            ItemField::Link => item.link = value,
            ItemField::Guid => item.guid = Some(value),
            ItemField::Description => item.description = Some(value),
            ItemField::ContentEncoded => item.content_encoded = Some(value),
            ItemField::PubDate => item.pub_date = Some(value),
            ItemField::Creator => item.creator = Some(value),
            ItemField::Category => item.categories.push(value),
        }
    }
}

/// Parses an RSS 2.0 document into its `<item>` entries, in document order.
/// A document without a `<channel>` is rejected.
pub fn parse_feed(xml: &str) -> Result<Vec<RawFeedItem>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut saw_channel = false;
    let mut current: Option<RawFeedItem> = None;
    let mut field: Option<ItemField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"channel" => saw_channel = true,
                b"item" => {
                    current = Some(RawFeedItem { position: items.len() + 1, ..Default::default() });
                    field = None;
                }
                tag if current.is_some() => {
                    field = ItemField::from_tag(tag);
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| SourceError::Parse(format!("Bad text in feed item: {}", e)))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    field = None;
                }
                tag => {
                    if let (Some(open), Some(item)) = (field, current.as_mut()) {
                        if ItemField::from_tag(tag) == Some(open) {
                            open.store(item, &text);
                            field = None;
                            text.clear();
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SourceError::Parse(format!(
                    "Feed XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_channel {
        return Err(SourceError::Parse("Document is not an RSS feed".to_string()));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::pipeline::ContentPipeline;
    use crate::content::structured_api::StructuredApiSource;
    use crate::models::ListFilter;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const THREE_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>Amogh Van Services</title>
  <link>https://school.example.com</link>
  <item>
    <title>New Route to Dadar</title>
    <link>https://school.example.com/2025/08/02/new-route-to-dadar/</link>
    <description><![CDATA[<p>We now stop at Dadar station.</p><img src="https://img.example.com/dadar.jpg">]]></description>
    <pubDate>Sat, 02 Aug 2025 10:00:00 +0000</pubDate>
  </item>
  <item>
    <title>Monsoon Timings &amp; Safety</title>
    <link>https://school.example.com/2025/07/15/monsoon-timings/</link>
    <description>&lt;p&gt;Pickups start ten minutes early.&lt;/p&gt;</description>
    <pubDate>Tue, 15 Jul 2025 08:00:00 +0000</pubDate>
    <dc:creator><![CDATA[Rajesh Kumar]]></dc:creator>
    <category><![CDATA[Safety]]></category>
  </item>
  <item>
    <title>Holiday Notice</title>
    <link>https://school.example.com/2025/06/01/holiday-notice/</link>
    <description>No service on the 15th.</description>
    <pubDate>Sun, 01 Jun 2025 08:00:00 +0000</pubDate>
  </item>
</channel>
</rss>"#;

    #[test]
    fn parses_items_in_document_order() {
        let items = parse_feed(THREE_ITEM_FEED).expect("valid feed");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].position, 1);
        assert_eq!(items[0].title, "New Route to Dadar");
        assert!(items[0].description.as_deref().unwrap_or("").contains("<img"));
        assert_eq!(items[1].title, "Monsoon Timings & Safety");
        assert_eq!(items[1].creator.as_deref(), Some("Rajesh Kumar"));
        assert_eq!(items[1].categories, vec!["Safety".to_string()]);
        assert_eq!(
            items[1].description.as_deref(),
            Some("<p>Pickups start ten minutes early.</p>")
        );
        assert_eq!(items[2].position, 3);
    }

    #[test]
    fn channel_title_is_not_an_item_title() {
        let items = parse_feed(THREE_ITEM_FEED).expect("valid feed");
        assert!(items.iter().all(|i| i.title != "Amogh Van Services"));
    }

    #[test]
    fn rejects_documents_that_are_not_feeds() {
        assert!(matches!(parse_feed("<html><body>Oops</body></html>"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_feed("<rss><channel><item></channel>"), Err(SourceError::Parse(_))));
    }

    #[test]
    fn unprefixed_body_and_creator_tags_are_read() {
        let xml = r#"<rss><channel><item>
            <title>Plain Tags</title>
            <link>https://site.example.com/plain-tags/</link>
            <encoded><![CDATA[<p>Full body</p>]]></encoded>
            <creator>Rajesh</creator>
        </item></channel></rss>"#;
        let items = parse_feed(xml).expect("valid feed");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_encoded.as_deref(), Some("<p>Full body</p>"));
        assert_eq!(items[0].creator.as_deref(), Some("Rajesh"));
    }

    #[test]
    fn empty_channel_is_an_empty_feed() {
        let items = parse_feed("<rss><channel><title>x</title></channel></rss>").expect("valid feed");
        assert!(items.is_empty());
    }

    #[test]
    fn relay_url_carries_the_encoded_feed_address() {
        let source = FeedSource::new(
            "https://school.example.com/",
            Some(DEFAULT_RELAY_URL.to_string()),
            DEFAULT_FEED_TIMEOUT,
        )
        .expect("client");
        assert_eq!(
            source.request_url().expect("url").as_str(),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fschool.example.com%2Ffeed%2F"
        );

        let direct = FeedSource::new("https://school.example.com", Some(" ".to_string()), DEFAULT_FEED_TIMEOUT)
            .expect("client");
        assert_eq!(direct.request_url().expect("url").as_str(), "https://school.example.com/feed/");
    }

    #[tokio::test]
    async fn feed_serves_listing_when_structured_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/relay"))
            .and(query_param("url", "https://school.example.com/feed/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/rss+xml")
                    .set_body_string(THREE_ITEM_FEED),
            )
            .expect(1)
            .mount(&server)
            .await;

        let structured = StructuredApiSource::new(
            format!("{}/wp-json/wp/v2", server.uri()),
            Duration::from_secs(1),
        )
        .expect("client");
        let feed = FeedSource::new(
            "https://school.example.com",
            Some(format!("{}/relay", server.uri())),
            Duration::from_secs(1),
        )
        .expect("client");
        let sources: Vec<Arc<dyn ContentSource>> = vec![Arc::new(structured), Arc::new(feed)];
        let pipeline = ContentPipeline::new(sources);

        let items = pipeline.list_items(&ListFilter::default()).await;
        let slugs: Vec<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new-route-to-dadar", "monsoon-timings", "holiday-notice"]);
        assert_eq!(items[0].featured_image_url.as_deref(), Some("https://img.example.com/dadar.jpg"));
        assert_eq!(items[1].categories, vec!["Safety".to_string()]);
        assert_eq!(items[2].categories, vec!["General".to_string()]);
        assert!(items.iter().all(|i| i.published_at.is_some()));
    }
}
