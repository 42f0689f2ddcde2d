//! Page-load wiring: what happens once the document is ready.

use crate::config::Config;
use crate::dom::Dom;
use crate::error::SiteError;
use crate::feeds::FeedFetcher;
use crate::nav::ScrollShrink;
use crate::planet::Planet;
use crate::search::{self, SearchDispatcher};
use tracing::{debug, info, warn};
use url::Url;

/// The parts of `document.location` that decide whether the page is being
/// viewed from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub protocol: String,
    pub origin: String,
    pub host: String,
    pub hostname: String,
}

impl Location {
    pub fn parse(s: &str) -> Result<Self, SiteError> {
        let url = Url::parse(s).map_err(|_| SiteError::BadLocation(s.to_string()))?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        let hostname = url.host_str().unwrap_or_default().to_string();
        let host = match url.port() {
            Some(port) => format!("{}:{}", hostname, port),
            None => hostname.clone(),
        };
        Self {
            protocol: format!("{}:", url.scheme()),
            origin: url.origin().ascii_serialization(),
            host,
            hostname,
        }
    }

    /// Only a page opened straight from disk skips the feed.
    pub fn is_network(&self) -> bool {
        self.protocol != "file:"
            || self.origin != "null"
            || !self.host.is_empty()
            || !self.hostname.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageReport {
    pub feed_requested: bool,
    /// Entries appended to the planet box; `None` when nothing was appended.
    pub entries_shown: Option<usize>,
}

/// Event handlers left installed after load.
#[derive(Debug, Clone)]
pub struct Handlers {
    pub scroll: ScrollShrink,
    pub search: SearchDispatcher,
}

#[derive(Debug, Clone)]
pub struct PageLoad {
    scroll: ScrollShrink,
    search: SearchDispatcher,
    planet: Planet,
}

impl PageLoad {
    pub fn new(scroll: ScrollShrink, search: SearchDispatcher, planet: Planet) -> Self {
        Self {
            scroll,
            search,
            planet,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SiteError> {
        Ok(Self::new(
            config.scroll_shrink(),
            config.dispatcher()?,
            config.planet(),
        ))
    }

    pub async fn run(
        self,
        dom: &mut impl Dom,
        location: &Location,
        fetcher: &dyn FeedFetcher,
    ) -> Result<(PageReport, Handlers), SiteError> {
        search::enable_advanced(dom)?;

        let handlers = Handlers {
            scroll: self.scroll,
            search: self.search,
        };
        let mut report = PageReport::default();

        if !location.is_network() {
            debug!(?location, "local page, skipping planet feed");
            return Ok((report, handlers));
        }

        report.feed_requested = true;
        match fetcher.fetch().await {
            Ok(data) => {
                report.entries_shown = self.planet.render_into(dom, &data)?;
                info!(shown = ?report.entries_shown, "planet feed rendered");
            }
            Err(e) => warn!(error = %e, "planet feed fetch failed"),
        }

        Ok((report, handlers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StaticPage;
    use crate::error::DomError;
    use crate::feeds::{FeedData, FeedEntry};
    use crate::search::ModeTable;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PAGE: &str = r#"<html><body id="body">
        <div id="home"></div><div id="jumplinks"></div>
        <div id="search">
          <form id="simplesearch">
            <input id="searchq" type="text">
            <span id="advancedsearch" class="hidden">
              <input type="radio" name="what" value="website" checked>
              <input type="radio" name="what" value="wiki">
            </span>
          </form>
        </div>
        <div id="planet"></div>
    </body></html>"#;

    struct StubFetcher {
        result: Result<FeedData, String>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(result: Result<FeedData, String>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self) -> anyhow::Result<FeedData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(anyhow::Error::msg)
        }
    }

    fn load() -> PageLoad {
        PageLoad::new(
            ScrollShrink::default(),
            SearchDispatcher::new(ModeTable::libvirt().unwrap(), crate::search::SearchMode::Website),
            Planet::default(),
        )
    }

    fn entries(n: usize) -> FeedData {
        FeedData::Entries(
            (0..n)
                .map(|i| FeedEntry {
                    link: format!("https://blog.example/{}", i),
                    title: format!("Post {}", i),
                    published_date: "2023-06-15".to_string(),
                    author: "Ann".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_location_network() {
        let loc = Location::parse("https://libvirt.org:8443/index.html").unwrap();
        assert_eq!(loc.protocol, "https:");
        assert_eq!(loc.origin, "https://libvirt.org:8443");
        assert_eq!(loc.host, "libvirt.org:8443");
        assert_eq!(loc.hostname, "libvirt.org");
        assert!(loc.is_network());
    }

    #[test]
    fn test_location_file() {
        let loc = Location::parse("file:///usr/share/doc/libvirt/html/index.html").unwrap();
        assert_eq!(loc.protocol, "file:");
        assert_eq!(loc.origin, "null");
        assert_eq!(loc.host, "");
        assert!(!loc.is_network());
    }

    #[test]
    fn test_location_invalid() {
        assert!(matches!(
            Location::parse("not a url"),
            Err(SiteError::BadLocation(_))
        ));
    }

    #[tokio::test]
    async fn test_network_page_renders_feed() {
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Ok(entries(7)));
        let location = Location::parse("https://libvirt.org/").unwrap();

        let (report, _) = load().run(&mut page, &location, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            report,
            PageReport {
                feed_requested: true,
                entries_shown: Some(4),
            }
        );
        assert_eq!(page.class_name("advancedsearch").unwrap(), "advancedsearch");
        assert!(page.appended_html("planet").unwrap().starts_with("<dl><dt>"));
    }

    #[tokio::test]
    async fn test_local_page_skips_feed() {
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Ok(entries(2)));
        let location = Location::parse("file:///tmp/index.html").unwrap();

        let (report, _) = load().run(&mut page, &location, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(!report.feed_requested);
        assert_eq!(page.mutated_ids(), ["advancedsearch"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Err("connection refused".to_string()));
        let location = Location::parse("https://libvirt.org/").unwrap();

        let (report, _) = load().run(&mut page, &location, &fetcher).await.unwrap();

        assert!(report.feed_requested);
        assert_eq!(report.entries_shown, None);
        assert_eq!(page.appended_html("planet").unwrap(), "");
    }

    #[tokio::test]
    async fn test_unavailable_feed_leaves_planet_untouched() {
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Ok(FeedData::Unavailable { status: 503 }));
        let location = Location::parse("https://libvirt.org/").unwrap();

        let (report, _) = load().run(&mut page, &location, &fetcher).await.unwrap();

        assert_eq!(report.entries_shown, None);
        assert_eq!(page.mutated_ids(), ["advancedsearch"]);
    }

    #[tokio::test]
    async fn test_missing_advanced_search_is_a_dom_error() {
        let mut page = StaticPage::parse(r#"<div id="planet"></div>"#);
        let fetcher = StubFetcher::new(Ok(entries(1)));
        let location = Location::parse("https://libvirt.org/").unwrap();

        let err = load().run(&mut page, &location, &fetcher).await.unwrap_err();
        assert!(matches!(err, SiteError::Dom(DomError::MissingElement(id)) if id == "advancedsearch"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_config_reports_bad_search_target() {
        let config: Config = toml::from_str(
            r#"
            [[search.modes]]
            name = "wiki"
            action = "not a url"
            field = "search"
            "#,
        )
        .unwrap();
        assert!(matches!(
            PageLoad::from_config(&config),
            Err(SiteError::Config(crate::error::ConfigError::BadTarget { .. }))
        ));
    }

    #[tokio::test]
    async fn test_from_config_three_mode_page() {
        let config: Config = toml::from_str("[search]\npreset = \"three-mode\"").unwrap();
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Ok(entries(0)));
        let location = Location::parse("file:///tmp/index.html").unwrap();

        let (_, handlers) = PageLoad::from_config(&config)
            .unwrap()
            .run(&mut page, &location, &fetcher)
            .await
            .unwrap();

        page.set_input_value("searchq", "snapshot").unwrap();
        page.check_radio("what", "wiki");
        let request = handlers.search.dispatch(&page).unwrap();
        assert_eq!(request.value, "site:wiki.libvirt.org snapshot");
    }

    #[tokio::test]
    async fn test_handlers_drive_page_after_load() {
        let mut page = StaticPage::parse(PAGE);
        let fetcher = StubFetcher::new(Ok(entries(0)));
        let location = Location::parse("https://libvirt.org/").unwrap();

        let (_, handlers) = load().run(&mut page, &location, &fetcher).await.unwrap();

        handlers.scroll.on_scroll(&mut page, 120).unwrap();
        assert_eq!(page.class_name("body").unwrap(), "navhide");

        page.set_input_value("searchq", "snapshot").unwrap();
        page.check_radio("what", "wiki");
        let request = handlers.search.dispatch(&page).unwrap();
        assert_eq!(
            request.url().unwrap().as_str(),
            "https://wiki.libvirt.org/index.php?search=snapshot"
        );
    }
}
