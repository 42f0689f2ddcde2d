use super::{FeedData, FeedFetcher, FeedResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PROXY_URL: &str = "https://feedrapp.herokuapp.com/";
pub const DEFAULT_FEED_URL: &str = "http://planet.virt-tools.org/atom.xml";
pub const DEFAULT_CALLBACK: &str = "jsonpRSSFeedCallback";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches the planet feed through the JSON feed aggregation proxy.
///
/// The proxy still gets a `callback` parameter, so the body may come back
/// wrapped as `callback({...})`. Either form is accepted.
pub struct ProxyFetcher {
    proxy_url: String,
    feed_url: String,
    callback: String,
    client: reqwest::Client,
}

impl ProxyFetcher {
    pub fn new(proxy_url: String, feed_url: String, callback: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            proxy_url,
            feed_url,
            callback,
            client,
        }
    }

    pub fn request_url(&self) -> String {
        format!(
            "{}?q={}&callback={}",
            self.proxy_url,
            urlencoding::encode(&self.feed_url),
            urlencoding::encode(&self.callback),
        )
    }
}

impl Default for ProxyFetcher {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROXY_URL.to_string(),
            DEFAULT_FEED_URL.to_string(),
            DEFAULT_CALLBACK.to_string(),
            DEFAULT_TIMEOUT,
        )
    }
}

/// Strip a JSONP wrapper such as `cb({...});` or
/// `/**/ typeof cb === 'function' && cb({...});` down to the JSON payload.
pub fn unwrap_jsonp<'a>(body: &'a str, callback: &str) -> &'a str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    let open = format!("{}(", callback);
    let Some(start) = trimmed.find(&open) else {
        return trimmed;
    };

    let inner = trimmed[start + open.len()..]
        .trim_end()
        .trim_end_matches(';')
        .trim_end();
    inner.strip_suffix(')').unwrap_or(inner)
}

#[async_trait]
impl FeedFetcher for ProxyFetcher {
    async fn fetch(&self) -> Result<FeedData> {
        let url = self.request_url();
        debug!(%url, "fetching planet feed via proxy");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("feed proxy error: {}", response.status()));
        }

        let body = response.text().await?;
        let parsed: FeedResponse = serde_json::from_str(unwrap_jsonp(&body, &self.callback))?;
        parsed.into_data()
    }
}
