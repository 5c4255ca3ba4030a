//! Controller configuration.
use serde::{Deserialize, Serialize};

use crate::constants::EVEN_CHILDREN_QUERY;

/// How header/content pairs are discovered inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PairQuery {
    /// Every second direct child starting from the first (`> :even`).
    #[default]
    EvenChildren,
    /// Descendant selector matching the headers; each header's next sibling is its content.
    Selector(String),
}

impl From<String> for PairQuery {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == EVEN_CHILDREN_QUERY {
            Self::EvenChildren
        } else {
            Self::Selector(trimmed.to_string())
        }
    }
}

impl From<&str> for PairQuery {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PairQuery> for String {
    fn from(query: PairQuery) -> Self {
        match query {
            PairQuery::EvenChildren => EVEN_CHILDREN_QUERY.to_string(),
            PairQuery::Selector(selector) => selector,
        }
    }
}

/// Options recognised by a collapse container.
///
/// Built once per controller and never mutated afterwards. Field names follow the
/// camelCase spelling used by host pages (`clickQuery`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollapseConfig {
    /// Only one section may be open at a time.
    pub accordion: bool,
    /// Restore and save open state keyed by the container id.
    pub persist: bool,
    /// Header discovery rule.
    pub query: PairQuery,
    /// Restricts the click trigger to matching elements inside a header.
    pub click_query: Option<String>,
}

impl CollapseConfig {
    #[must_use]
    pub const fn accordion() -> Self {
        Self {
            accordion: true,
            persist: false,
            query: PairQuery::EvenChildren,
            click_query: None,
        }
    }

    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<PairQuery>) -> Self {
        self.query = query.into();
        self
    }

    #[must_use]
    pub fn with_click_query(mut self, click_query: impl Into<String>) -> Self {
        self.click_query = Some(click_query.into());
        self
    }

    /// Parse the space separated flag list carried by a `data-collapse` marker.
    ///
    /// `"accordion persist"` turns both options on. Unknown words are ignored.
    #[must_use]
    pub fn from_flags(flags: &str) -> Self {
        let mut config = Self::default();
        for flag in flags.split_whitespace() {
            match flag {
                "accordion" => config.accordion = true,
                "persist" => config.persist = true,
                other => log::debug!("ignoring unknown collapse flag `{other}`"),
            }
        }
        config
    }

    /// Parse a JSON options object such as `{"accordion": true, "clickQuery": ".title"}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Selector a click target must sit inside for the controller to react.
    #[must_use]
    pub fn trigger_selector(&self) -> String {
        let summary = format!("[{}]", crate::constants::SUMMARY_ATTR);
        match self.click_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => format!("{summary} {query}"),
            _ => summary,
        }
    }
}
