//! Rendering of the planet feed box.

use crate::dom::Dom;
use crate::error::DomError;
use crate::feeds::{FeedData, FeedEntry};
use crate::html;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use std::fmt;
use tracing::debug;

pub const MAX_ENTRIES: usize = 4;
pub const PLANET_ID: &str = "planet";

/// What browsers print for a date they cannot parse.
const INVALID_DATE: &str = "Invalid Date";
const DATE_FORMAT: &str = "%-d %b %Y";

#[derive(Debug, Clone, Copy)]
pub struct Planet {
    max_entries: usize,
    /// Zone dates are shown in; the viewer's local zone when unset.
    zone: Option<FixedOffset>,
}

impl Default for Planet {
    fn default() -> Self {
        Self::new(MAX_ENTRIES)
    }
}

impl Planet {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            zone: None,
        }
    }

    pub fn in_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = Some(zone);
        self
    }

    fn visible<'a>(&self, entries: &'a [FeedEntry]) -> &'a [FeedEntry] {
        &entries[..entries.len().min(self.max_entries)]
    }

    /// Build the `<dl>` for a feed, or nothing if the aggregator reported a
    /// failure.
    pub fn render(&self, data: &FeedData) -> Option<String> {
        let FeedData::Entries(entries) = data else {
            return None;
        };

        let mut out = String::from("<dl>");
        for entry in self.visible(entries) {
            out.push_str(&format!(
                "<dt><a href=\"{}\">{}</a></dt><dd>{}</dd>",
                html::escape(&entry.link),
                html::escape(&entry.title),
                html::escape(&self.describe(entry)),
            ));
        }
        out.push_str("</dl>");
        Some(out)
    }

    /// Render into the planet container. Returns the number of entries shown,
    /// or `None` when nothing was appended.
    pub fn render_into(&self, dom: &mut impl Dom, data: &FeedData) -> Result<Option<usize>, DomError> {
        let Some(html) = self.render(data) else {
            debug!(?data, "feed unavailable, planet left untouched");
            return Ok(None);
        };

        dom.append_html(PLANET_ID, &html)?;
        let shown = match data {
            FeedData::Entries(entries) => self.visible(entries).len(),
            FeedData::Unavailable { .. } => 0,
        };
        Ok(Some(shown))
    }

    /// Plain-text listing for terminals.
    pub fn render_text(&self, entries: &[FeedEntry], width: usize) -> String {
        let mut out = String::new();
        for (i, entry) in self.visible(entries).iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, entry.title));
            if !entry.link.is_empty() {
                out.push_str(&format!("   {}\n", entry.link));
            }
            let indent = "   ";
            let options = textwrap::Options::new(width.max(indent.len() + 10))
                .initial_indent(indent)
                .subsequent_indent(indent);
            for line in textwrap::wrap(self.describe(entry).trim_start(), options) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// The description line under each title, leading space included.
    pub fn describe(&self, entry: &FeedEntry) -> String {
        let date = match &self.zone {
            Some(zone) => format_published_in(&entry.published_date, zone),
            None => format_published(&entry.published_date),
        };
        format!(" by {} on {}", entry.author, date)
    }
}

/// Bare `YYYY-MM-DD` dates are taken as UTC midnight, as browsers do.
fn parse_published(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().fixed_offset())
        })
}

/// Day, abbreviated month and year in the local zone, e.g. `15 Jun 2023`.
pub fn format_published(raw: &str) -> String {
    format_published_in(raw, &Local)
}

pub fn format_published_in<Tz>(raw: &str, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match parse_published(raw) {
        Some(date) => date.with_timezone(zone).format(DATE_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}
