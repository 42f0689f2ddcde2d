use super::{FeedData, FeedEntry, FeedFetcher};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Reads the planet Atom feed directly, without the aggregation proxy.
pub struct AtomFetcher {
    feed_url: String,
    client: reqwest::Client,
}

impl AtomFetcher {
    pub fn new(feed_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { feed_url, client }
    }
}

/// Map a parsed Atom/RSS document onto the proxy's entry shape, keeping
/// document order.
fn entries_from_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            link: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            published_date: entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            author: entry
                .authors
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
        })
        .collect();

    Ok(entries)
}

#[async_trait]
impl FeedFetcher for AtomFetcher {
    async fn fetch(&self) -> Result<FeedData> {
        debug!(url = %self.feed_url, "fetching planet feed directly");

        let response = self.client.get(&self.feed_url).send().await?;

        if !response.status().is_success() {
            // Same outcome as the proxy reporting a bad upstream status.
            return Ok(FeedData::Unavailable {
                status: i64::from(response.status().as_u16()),
            });
        }

        let bytes = response.bytes().await?;
        Ok(FeedData::Entries(entries_from_feed(&bytes)?))
    }
}
