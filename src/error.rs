use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("no element with id `{0}`")]
    MissingElement(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown search mode `{0}`")]
    UnknownMode(String),

    #[error("invalid search target url `{url}`: {source}")]
    BadTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid page location `{0}`")]
    BadLocation(String),
}
