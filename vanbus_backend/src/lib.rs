use std::sync::Arc;

use crate::config::Config;
use crate::content::{ContentPipeline, ContentSource, FeedSource, StructuredApiSource};
use crate::registration::{DeliveryRelay, EmailRelay, RegistrationStore};

/// Shared by every worker.
pub struct AppState {
    pub pipeline: ContentPipeline,
    pub registrations: RegistrationStore,
    pub relay: Arc<dyn DeliveryRelay>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(AppState {
            pipeline: build_pipeline(config)?,
            registrations: RegistrationStore::new(config.registration_idle()),
            relay: Arc::new(EmailRelay::new(config.email_relay_settings())?),
        })
    }
}

/// Structured API first, then the feed.
pub fn build_pipeline(config: &Config) -> Result<ContentPipeline, reqwest::Error> {
    let structured = StructuredApiSource::new(&config.content.api_base_url, config.api_timeout())?;
    let feed = FeedSource::new(&config.content.site_url, config.feed_relay(), config.feed_timeout())?;
    let sources: Vec<Arc<dyn ContentSource>> = vec![Arc::new(structured), Arc::new(feed)];
    Ok(ContentPipeline::new(sources))
}

pub mod config;
pub mod content;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod registration;
pub mod routes;
