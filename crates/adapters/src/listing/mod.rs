//! Careers listing adapters
//!
//! Both sources render the search results page for a query and hand the markup
//! to [`ListingParser`], which turns every job card into an [`Entry`].

mod command;
mod http;

pub use command::CommandListingSource;
pub use http::HttpListingSource;

use async_trait::async_trait;
use careers_watch_domain::{Entry, FetchError, ListingSource, Snapshot};
use regex::{Captures, Regex};
use reqwest::Url;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://careers.google.com";
const RESULTS_PATH: &str = "/jobs/results/";
const CARD_CLASS: &str = "gc-card";

/// Build the search results URL for a query
pub fn listing_url(base_url: &str, query: &str) -> Result<Url, FetchError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), RESULTS_PATH);
    let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}

/// Extracts job cards from a rendered results page
///
/// A card is an `<a>` element whose class list contains `gc-card`. Its
/// `aria-label` is the entry name and its `href`, resolved against the base
/// URL, is the entry link.
pub struct ListingParser {
    base_url: String,
    anchor: Regex,
    attribute: Regex,
    entity: Regex,
}

impl ListingParser {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let anchor = Regex::new(r"(?is)<a\b[^>]*>").expect("Valid regex");
        let attribute = Regex::new(
            r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
        )
        .expect("Valid regex");
        let entity = Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z]+));")
            .expect("Valid regex");

        Self {
            base_url,
            anchor,
            attribute,
            entity,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse all job cards in page order
    ///
    /// A page without any card means the results never rendered.
    pub fn parse(&self, page: &str) -> Result<Snapshot, FetchError> {
        let mut entries = Vec::new();
        let mut cards = 0usize;

        for tag in self.anchor.find_iter(page) {
            let attributes = self.attributes(tag.as_str());
            let is_card = attributes
                .get("class")
                .is_some_and(|class| class.split_whitespace().any(|c| c == CARD_CLASS));
            if !is_card {
                continue;
            }
            cards += 1;

            let (Some(name), Some(href)) = (attributes.get("aria-label"), attributes.get("href"))
            else {
                tracing::warn!(tag = %tag.as_str(), "Skipping job card without label or link");
                continue;
            };

            entries.push(Entry::new(self.decode(name), self.resolve(&self.decode(href))));
        }

        if cards == 0 {
            return Err(FetchError::Structure(format!(
                "no `{}` elements on page",
                CARD_CLASS
            )));
        }

        Ok(entries)
    }

    fn attributes(&self, tag: &str) -> HashMap<String, String> {
        self.attribute
            .captures_iter(tag)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_ascii_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                Some((name, value))
            })
            .collect()
    }

    /// Decode character references in an attribute value
    ///
    /// Numeric references are decoded generically; unknown named ones are kept verbatim.
    fn decode(&self, value: &str) -> String {
        if !value.contains('&') {
            return value.to_string();
        }

        self.entity
            .replace_all(value, |caps: &Captures<'_>| {
                let decoded = if let Some(dec) = caps.get(1) {
                    dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
                } else if let Some(hex) = caps.get(2) {
                    u32::from_str_radix(hex.as_str(), 16)
                        .ok()
                        .and_then(char::from_u32)
                } else {
                    caps.get(3).and_then(|name| named_entity(name.as_str()))
                };

                match decoded {
                    Some(c) => c.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.base_url, href)
        }
    }
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        _ => return None,
    };
    Some(c)
}

/// Stub listing source for testing
pub struct StubListingSource {
    entries: Option<Snapshot>,
}

impl StubListingSource {
    /// Create a stub that always returns these entries
    pub fn with_entries(entries: Snapshot) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// Create a stub whose page never renders
    pub fn failing() -> Self {
        Self { entries: None }
    }
}

#[async_trait]
impl ListingSource for StubListingSource {
    async fn fetch(&self, _query: &str) -> Result<Snapshot, FetchError> {
        self.entries
            .clone()
            .ok_or_else(|| FetchError::Structure("stub listing unavailable".to_string()))
    }
}
