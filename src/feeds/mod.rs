pub mod atom;
pub mod proxy;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

pub const STATUS_OK: i64 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
}

/// The aggregator sends `null` for fields a feed item lacks.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedData {
    Entries(Vec<FeedEntry>),
    /// The aggregator answered, but with a non-200 `responseStatus`.
    Unavailable { status: i64 },
}

/// Envelope returned by the feed aggregation proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub response_status: i64,
    #[serde(default)]
    pub response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseData {
    pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub entries: Vec<FeedEntry>,
}

impl FeedResponse {
    pub fn into_data(self) -> Result<FeedData> {
        if self.response_status != STATUS_OK {
            return Ok(FeedData::Unavailable {
                status: self.response_status,
            });
        }
        let data = self
            .response_data
            .ok_or_else(|| anyhow::anyhow!("feed response has status 200 but no responseData"))?;
        Ok(FeedData::Entries(data.feed.entries))
    }
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Result<FeedData>;
}
