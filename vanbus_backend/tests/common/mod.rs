#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;
use std::time::Duration;
use vanbus_backend::content::{ContentPipeline, ContentSource, FeedSource, StructuredApiSource};
use vanbus_backend::registration::{EmailRelay, EmailRelaySettings, RegistrationStore};
use vanbus_backend::AppState;
use wiremock::MockServer;

pub const SITE_URL: &str = "https://school.example.com";
pub const API_PATH: &str = "/wp-json/wp/v2/posts";
pub const RELAY_PATH: &str = "/relay";
pub const EMAIL_PATH: &str = "/api/v1.0/email/send";

pub const THREE_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>Amogh Van Services</title>
  <item>
    <title>New Route to Dadar</title>
    <link>https://school.example.com/2025/08/02/new-route-to-dadar/</link>
    <description>We now stop at Dadar station every morning.</description>
    <pubDate>Sat, 02 Aug 2025 10:00:00 +0000</pubDate>
  </item>
  <item>
    <title>Monsoon Timings</title>
    <link>https://school.example.com/2025/07/15/monsoon-timings/</link>
    <description>Pickups start ten minutes early during heavy rain.</description>
    <pubDate>Tue, 15 Jul 2025 08:00:00 +0000</pubDate>
  </item>
  <item>
    <title>Holiday Notice</title>
    <link>https://school.example.com/2025/06/01/holiday-notice/</link>
    <description>No service on the 15th.</description>
    <pubDate>Sun, 01 Jun 2025 08:00:00 +0000</pubDate>
  </item>
</channel>
</rss>"#;

/// Application state whose content sources and email relay all point at `server`.
pub fn state_for(server: &MockServer) -> web::Data<AppState> {
    let structured = StructuredApiSource::new(
        format!("{}/wp-json/wp/v2", server.uri()),
        Duration::from_millis(500),
    )
    .expect("structured client");
    let feed = FeedSource::new(
        SITE_URL,
        Some(format!("{}{}", server.uri(), RELAY_PATH)),
        Duration::from_millis(500),
    )
    .expect("feed client");
    let sources: Vec<Arc<dyn ContentSource>> = vec![Arc::new(structured), Arc::new(feed)];

    let relay = EmailRelay::new(EmailRelaySettings {
        endpoint: format!("{}{}", server.uri(), EMAIL_PATH),
        ..EmailRelaySettings::default()
    })
    .expect("relay client");

    web::Data::new(AppState {
        pipeline: ContentPipeline::new(sources),
        registrations: RegistrationStore::new(Duration::from_secs(3600)),
        relay: Arc::new(relay),
    })
}
