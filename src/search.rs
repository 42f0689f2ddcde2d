//! Search dispatch: the simple search form is never submitted as-is. Its
//! query and the `what` radio selection are turned into a one-field GET
//! request against an external search target.

use crate::dom::Dom;
use crate::error::{ConfigError, DomError};
use crate::html;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use url::Url;

pub const QUERY_ID: &str = "searchq";
pub const MODE_GROUP: &str = "what";
pub const ADVANCED_ID: &str = "advancedsearch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Website,
    Wiki,
    Devs,
    Users,
    Lists,
}

impl SearchMode {
    pub const ALL: [SearchMode; 5] = [
        SearchMode::Website,
        SearchMode::Wiki,
        SearchMode::Devs,
        SearchMode::Users,
        SearchMode::Lists,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Website => "website",
            SearchMode::Wiki => "wiki",
            SearchMode::Devs => "devs",
            SearchMode::Users => "users",
            SearchMode::Lists => "lists",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// Where one mode sends the query, and how the query is scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTarget {
    pub action: Url,
    pub field: String,
    pub prefix: String,
}

impl ModeTarget {
    pub fn new(action: &str, field: &str, prefix: &str) -> Result<Self, ConfigError> {
        let action = Url::parse(action).map_err(|source| ConfigError::BadTarget {
            url: action.to_string(),
            source,
        })?;
        Ok(Self {
            action,
            field: field.to_string(),
            prefix: prefix.to_string(),
        })
    }

    pub fn apply(&self, query: &str) -> String {
        format!("{}{}", self.prefix, query)
    }
}

/// The two generations of the search form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TablePreset {
    /// website, wiki (MediaWiki search), devs and users list archives.
    #[default]
    FourMode,
    /// website, wiki and lists, all through Google.
    ThreeMode,
}

const GOOGLE_SEARCH: &str = "https://google.com/search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    targets: Vec<(SearchMode, ModeTarget)>,
    /// Form used for modes with no entry; its value is left blank.
    fallback: Option<ModeTarget>,
}

impl ModeTable {
    pub fn empty() -> Self {
        Self {
            targets: Vec::new(),
            fallback: None,
        }
    }

    pub fn preset(preset: TablePreset) -> Result<Self, ConfigError> {
        match preset {
            TablePreset::FourMode => Self::libvirt(),
            TablePreset::ThreeMode => Self::libvirt_three_mode(),
        }
    }

    /// The four libvirt search targets.
    pub fn libvirt() -> Result<Self, ConfigError> {
        let google = GOOGLE_SEARCH;
        let mut table = Self::empty();
        table.set(
            SearchMode::Website,
            ModeTarget::new(google, "q", "site:libvirt.org ")?,
        );
        table.set(
            SearchMode::Wiki,
            ModeTarget::new("https://wiki.libvirt.org/index.php", "search", "")?,
        );
        table.set(
            SearchMode::Devs,
            ModeTarget::new(google, "q", "site:redhat.com/archives/libvir-list ")?,
        );
        table.set(
            SearchMode::Users,
            ModeTarget::new(google, "q", "site:redhat.com/archives/libvirt-users ")?,
        );
        Ok(table)
    }

    /// The older form: every mode goes to Google, and the form is aimed at
    /// Google before the mode is looked at.
    pub fn libvirt_three_mode() -> Result<Self, ConfigError> {
        let mut table = Self::empty();
        table.set(
            SearchMode::Website,
            ModeTarget::new(GOOGLE_SEARCH, "q", "site:libvirt.org ")?,
        );
        table.set(
            SearchMode::Wiki,
            ModeTarget::new(GOOGLE_SEARCH, "q", "site:wiki.libvirt.org ")?,
        );
        table.set(
            SearchMode::Lists,
            ModeTarget::new(GOOGLE_SEARCH, "q", "site:redhat.com inurl:/archives/libvir ")?,
        );
        table.fallback = Some(ModeTarget::new(GOOGLE_SEARCH, "q", "")?);
        Ok(table)
    }

    pub fn set(&mut self, mode: SearchMode, target: ModeTarget) {
        match self.targets.iter_mut().find(|(m, _)| *m == mode) {
            Some((_, existing)) => *existing = target,
            None => self.targets.push((mode, target)),
        }
    }

    pub fn without(mut self, mode: SearchMode) -> Self {
        self.targets.retain(|(m, _)| *m != mode);
        self
    }

    pub fn get(&self, mode: SearchMode) -> Option<&ModeTarget> {
        self.targets
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, t)| t)
    }

    pub fn modes(&self) -> impl Iterator<Item = SearchMode> + '_ {
        self.targets.iter().map(|(m, _)| *m)
    }
}

/// A synthesized hidden GET form holding exactly one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// `None` when the selected mode has no target and the table no
    /// fallback: the form then has no action and its input no name.
    pub action: Option<Url>,
    pub field: Option<String>,
    pub value: String,
}

impl SearchRequest {
    fn unresolved() -> Self {
        Self {
            action: None,
            field: None,
            value: String::new(),
        }
    }

    pub fn method(&self) -> &'static str {
        "get"
    }

    /// The page navigated to when the form is submitted.
    pub fn url(&self) -> Option<Url> {
        let mut url = self.action.clone()?;
        if let Some(field) = &self.field {
            url.query_pairs_mut().append_pair(field, &self.value);
        }
        Some(url)
    }

    pub fn form_html(&self) -> String {
        let action = self
            .action
            .as_ref()
            .map(|a| format!(" action=\"{}\"", html::escape(a.as_str())))
            .unwrap_or_default();
        let name = self
            .field
            .as_ref()
            .map(|f| format!(" name=\"{}\"", html::escape(f)))
            .unwrap_or_default();
        format!(
            "<form method=\"{}\"{}><input type=\"hidden\"{} value=\"{}\"></form>",
            self.method(),
            action,
            name,
            html::escape(&self.value),
        )
    }
}

/// Makes the mode radio buttons visible.
pub fn enable_advanced(dom: &mut impl Dom) -> Result<(), DomError> {
    dom.set_class_name(ADVANCED_ID, ADVANCED_ID)
}

/// Submit handler for the simple search form.
#[derive(Debug, Clone)]
pub struct SearchDispatcher {
    table: ModeTable,
    default_mode: SearchMode,
}

impl SearchDispatcher {
    pub fn new(table: ModeTable, default_mode: SearchMode) -> Self {
        Self {
            table,
            default_mode,
        }
    }

    /// Build the outgoing request for the radio value `what`.
    pub fn request_for(&self, what: &str, query: &str) -> SearchRequest {
        let target = match what.parse::<SearchMode>() {
            Ok(mode) => self.table.get(mode),
            Err(_) => None,
        };

        match target {
            Some(target) => SearchRequest {
                action: Some(target.action.clone()),
                field: Some(target.field.clone()),
                value: target.apply(query),
            },
            None => {
                warn!(mode = what, "no search target for mode");
                match &self.table.fallback {
                    Some(form) => SearchRequest {
                        action: Some(form.action.clone()),
                        field: Some(form.field.clone()),
                        value: String::new(),
                    },
                    None => SearchRequest::unresolved(),
                }
            }
        }
    }

    /// Handle a submission. Consumes the dispatcher: once the form is
    /// submitted the page navigates away.
    pub fn dispatch(self, dom: &impl Dom) -> Result<SearchRequest, DomError> {
        let query = dom.input_value(QUERY_ID)?;
        let what = dom
            .checked_value(MODE_GROUP)
            .unwrap_or(self.default_mode.as_str());

        let request = self.request_for(what, query);
        debug!(mode = what, url = ?request.url().map(String::from), "search dispatched");
        Ok(request)
    }
}

/// Navigate to the request's target in the user's browser.
pub fn open_in_browser(request: &SearchRequest) -> anyhow::Result<()> {
    let url = request
        .url()
        .ok_or_else(|| anyhow::anyhow!("search request has no target"))?;
    open::that(url.as_str())?;
    Ok(())
}
