//! Case-insensitive contextual search over the wrapped line table.

mod finder;
mod matcher;

pub use finder::{SearchOutcome, SearchResult, Searcher};
pub use matcher::MatchMode;
