/// Case-insensitive line matching for plain and regex queries.
use anyhow::{Context, Result};
use regex::Regex;

/// How a query string is interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring containment.
    #[default]
    Substring,
    /// Case-insensitive regular expression.
    Regex,
}

impl MatchMode {
    pub fn from_regex_flag(use_regex: bool) -> Self {
        if use_regex {
            Self::Regex
        } else {
            Self::Substring
        }
    }
}

/// A compiled query, ready to test lines.
#[derive(Debug)]
pub(crate) enum LineMatcher {
    /// Lower-cased needle, compared against lower-cased line text.
    Substring(String),
    Regex(Regex),
}

impl LineMatcher {
    /// Compiles `query` for `mode`.
    ///
    /// An invalid regular expression is logged and searched for literally.
    pub fn new(query: &str, mode: MatchMode) -> Self {
        match mode {
            MatchMode::Substring => Self::Substring(query.to_lowercase()),
            MatchMode::Regex => match build_regex(query) {
                Ok(regex) => Self::Regex(regex),
                Err(e) => {
                    tracing::warn!("{e:#}; searching for {query:?} literally");
                    Self::Substring(query.to_lowercase())
                }
            },
        }
    }

    /// Whether this matcher compares against lower-cased text.
    pub fn wants_folded(&self) -> bool {
        matches!(self, Self::Substring(_))
    }

    /// Tests one line. `text` must be lower-cased when `wants_folded()` is true.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Substring(needle) => text.contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}

fn build_regex(query: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){query}")).context("invalid search pattern")
}
