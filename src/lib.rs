//! Behaviors of the libvirt documentation site: header shrink on scroll,
//! the planet feed box, and search dispatch to external search targets.

pub mod config;
pub mod dom;
pub mod error;
pub mod feeds;
pub mod html;
pub mod nav;
pub mod page;
pub mod planet;
pub mod search;

pub use config::Config;
pub use dom::{Dom, StaticPage};
pub use error::{ConfigError, DomError, SiteError};
pub use page::{Location, PageLoad, PageReport};
