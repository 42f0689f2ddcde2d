use crate::error::ConfigError;
use crate::feeds::atom::AtomFetcher;
use crate::feeds::proxy::{self, ProxyFetcher};
use crate::feeds::FeedFetcher;
use crate::nav::{ScrollShrink, SHRINK_THRESHOLD};
use crate::planet::{Planet, MAX_ENTRIES};
use crate::search::{ModeTable, ModeTarget, SearchDispatcher, SearchMode, TablePreset};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub nav: NavConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    #[default]
    Proxy,
    Atom,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub source: FeedSource,
    pub proxy_url: String,
    pub feed_url: String,
    pub callback: String,
    pub max_entries: usize,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::Proxy,
            proxy_url: proxy::DEFAULT_PROXY_URL.to_string(),
            feed_url: proxy::DEFAULT_FEED_URL.to_string(),
            callback: proxy::DEFAULT_CALLBACK.to_string(),
            max_entries: MAX_ENTRIES,
            timeout_secs: proxy::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub shrink_threshold: i64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            shrink_threshold: SHRINK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub preset: TablePreset,
    pub default_mode: SearchMode,
    /// Overrides for individual entries of the preset table.
    pub modes: Vec<ModeConfig>,
    pub disabled: Vec<SearchMode>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preset: TablePreset::FourMode,
            default_mode: SearchMode::Website,
            modes: Vec::new(),
            disabled: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModeConfig {
    pub name: SearchMode,
    pub action: String,
    pub field: String,
    #[serde(default)]
    pub prefix: String,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("docsite").join("config.toml"))
    }

    /// Load from `path`, or from the default location when it exists.
    /// With neither, the built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn mode_table(&self) -> Result<ModeTable, ConfigError> {
        let mut table = ModeTable::preset(self.search.preset)?;
        for mode in &self.search.modes {
            table.set(
                mode.name,
                ModeTarget::new(&mode.action, &mode.field, &mode.prefix)?,
            );
        }
        for mode in &self.search.disabled {
            table = table.without(*mode);
        }
        Ok(table)
    }

    pub fn dispatcher(&self) -> Result<SearchDispatcher, ConfigError> {
        Ok(SearchDispatcher::new(
            self.mode_table()?,
            self.search.default_mode,
        ))
    }

    pub fn scroll_shrink(&self) -> ScrollShrink {
        ScrollShrink::new(self.nav.shrink_threshold)
    }

    pub fn planet(&self) -> Planet {
        Planet::new(self.feed.max_entries)
    }

    pub fn create_fetcher(&self) -> Box<dyn FeedFetcher> {
        let timeout = Duration::from_secs(self.feed.timeout_secs);
        match self.feed.source {
            FeedSource::Proxy => Box::new(ProxyFetcher::new(
                self.feed.proxy_url.clone(),
                self.feed.feed_url.clone(),
                self.feed.callback.clone(),
                timeout,
            )),
            FeedSource::Atom => Box::new(AtomFetcher::new(self.feed.feed_url.clone(), timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.source, FeedSource::Proxy);
        assert_eq!(config.feed.max_entries, 4);
        assert_eq!(config.feed.timeout_secs, 20);
        assert_eq!(config.nav.shrink_threshold, 94);
        assert_eq!(config.search.default_mode, SearchMode::Website);
        assert_eq!(config.mode_table().unwrap(), ModeTable::libvirt().unwrap());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [feed]
            source = "atom"
            max_entries = 2

            [nav]
            shrink_threshold = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.source, FeedSource::Atom);
        assert_eq!(config.feed.max_entries, 2);
        assert_eq!(config.feed.callback, "jsonpRSSFeedCallback");
        assert_eq!(config.nav.shrink_threshold, 40);
    }

    #[test]
    fn test_search_overrides() {
        let config: Config = toml::from_str(
            r#"
            [search]
            default_mode = "wiki"
            disabled = ["devs"]

            [[search.modes]]
            name = "users"
            action = "https://lists.example/search"
            field = "query"
            "#,
        )
        .unwrap();

        let table = config.mode_table().unwrap();
        assert!(table.get(SearchMode::Devs).is_none());
        let users = table.get(SearchMode::Users).unwrap();
        assert_eq!(users.action.as_str(), "https://lists.example/search");
        assert_eq!(users.apply("foo"), "foo");
        assert_eq!(config.search.default_mode, SearchMode::Wiki);
    }

    #[test]
    fn test_three_mode_preset() {
        let config: Config = toml::from_str(
            r#"
            [search]
            preset = "three-mode"
            "#,
        )
        .unwrap();

        let table = config.mode_table().unwrap();
        assert_eq!(table, ModeTable::libvirt_three_mode().unwrap());
        assert_eq!(
            table.modes().collect::<Vec<_>>(),
            vec![SearchMode::Website, SearchMode::Wiki, SearchMode::Lists]
        );
        assert_eq!(
            table.get(SearchMode::Lists).unwrap().apply("foo"),
            "site:redhat.com inurl:/archives/libvir foo"
        );
    }

    #[test]
    fn test_unknown_mode_in_file_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [search]
            default_mode = "mail"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\nfeed_url = \"https://planet.example/atom.xml\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.feed.feed_url, "https://planet.example/atom.xml");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed\nnot toml").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(Some(dir.path().join("nope.toml").as_path())),
            Err(ConfigError::Read { .. })
        ));
    }
}
