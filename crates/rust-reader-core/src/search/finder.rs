/// Contextual search over a wrapped line table, memoized per query.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::matcher::{LineMatcher, MatchMode};
use crate::line::DisplayLine;

/// Matches for one query, with one line of context on either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub search_text: String,
    /// Union of every match's context window, in line-table order.
    pub results: Vec<DisplayLine>,
    /// Number of lines that matched directly (context lines excluded).
    pub total: usize,
}

/// What a search returned.
///
/// An empty query means "no filter" and hands back the searcher's own line
/// table; a query with no hits is `Filtered` with empty `results`.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Unfiltered(Arc<[DisplayLine]>),
    Filtered(Arc<SearchResult>),
}

impl SearchOutcome {
    /// The line sequence to display for this outcome.
    pub fn lines(&self) -> &[DisplayLine] {
        match self {
            Self::Unfiltered(lines) => lines,
            Self::Filtered(result) => &result.results,
        }
    }

    /// Direct match count, or `None` when unfiltered.
    pub fn total(&self) -> Option<usize> {
        match self {
            Self::Unfiltered(_) => None,
            Self::Filtered(result) => Some(result.total),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered(_))
    }
}

/// Search engine bound to one line table.
///
/// Results are cached per exact query string. A new line table (new document
/// or re-wrap) needs a new `Searcher`, which starts with an empty cache.
#[derive(Debug)]
pub struct Searcher {
    lines: Arc<[DisplayLine]>,
    mode: MatchMode,
    /// Lower-cased line texts, built on the first substring search.
    folded: Option<Vec<String>>,
    memo: HashMap<String, Arc<SearchResult>>,
}

impl Searcher {
    pub fn new(lines: Arc<[DisplayLine]>, mode: MatchMode) -> Self {
        Self {
            lines,
            mode,
            folded: None,
            memo: HashMap::new(),
        }
    }

    pub fn lines(&self) -> &Arc<[DisplayLine]> {
        &self.lines
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of distinct queries currently cached.
    pub fn cached_queries(&self) -> usize {
        self.memo.len()
    }

    /// Runs `query` against the line table.
    pub fn search(&mut self, query: Option<&str>) -> SearchOutcome {
        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => return SearchOutcome::Unfiltered(Arc::clone(&self.lines)),
        };

        if let Some(hit) = self.memo.get(query) {
            return SearchOutcome::Filtered(Arc::clone(hit));
        }

        let result = Arc::new(self.run(query));
        tracing::debug!(
            "Search {query:?}: {} matches, {} rows",
            result.total,
            result.results.len()
        );
        self.memo.insert(query.to_string(), Arc::clone(&result));
        SearchOutcome::Filtered(result)
    }

    fn run(&mut self, query: &str) -> SearchResult {
        let matcher = LineMatcher::new(query, self.mode);
        let last = self.lines.len().saturating_sub(1);
        let mut window = BTreeSet::new();
        let mut total = 0;

        let texts: Vec<&str> = if matcher.wants_folded() {
            let lines = &self.lines;
            self.folded
                .get_or_insert_with(|| lines.iter().map(|l| l.text.to_lowercase()).collect())
                .iter()
                .map(String::as_str)
                .collect()
        } else {
            self.lines.iter().map(|l| l.text.as_str()).collect()
        };

        for (i, text) in texts.iter().enumerate() {
            if !matcher.is_match(text) {
                continue;
            }
            total += 1;
            if i > 0 {
                window.insert(i - 1);
            }
            window.insert(i);
            if i < last {
                window.insert(i + 1);
            }
        }

        SearchResult {
            search_text: query.to_string(),
            results: window.into_iter().map(|i| self.lines[i].clone()).collect(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(texts: &[&str]) -> Arc<[DisplayLine]> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| DisplayLine::new(*t, i + 1))
            .collect()
    }

    fn result_texts(outcome: &SearchOutcome) -> Vec<&str> {
        outcome.lines().iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_single_match_with_context() {
        let mut s = Searcher::new(table(&["a", "b", "MATCH", "d", "e"]), MatchMode::Substring);
        let outcome = s.search(Some("match"));
        assert_eq!(outcome.total(), Some(1));
        assert_eq!(result_texts(&outcome), vec!["b", "MATCH", "d"]);
    }

    #[test]
    fn test_adjacent_matches_dedup() {
        let mut s = Searcher::new(table(&["a", "MATCH1", "MATCH2", "d"]), MatchMode::Substring);
        let outcome = s.search(Some("match"));
        assert_eq!(outcome.total(), Some(2));
        assert_eq!(result_texts(&outcome), vec!["a", "MATCH1", "MATCH2", "d"]);
    }

    #[test]
    fn test_boundary_matches() {
        let mut s = Searcher::new(table(&["hit", "x", "y", "z", "hit"]), MatchMode::Substring);
        let outcome = s.search(Some("HIT"));
        assert_eq!(outcome.total(), Some(2));
        assert_eq!(result_texts(&outcome), vec!["hit", "x", "z", "hit"]);
    }

    #[test]
    fn test_empty_query_returns_input_table() {
        let lines = table(&["a", "b"]);
        let mut s = Searcher::new(Arc::clone(&lines), MatchMode::Substring);
        for query in [None, Some("")] {
            match s.search(query) {
                SearchOutcome::Unfiltered(out) => assert!(Arc::ptr_eq(&out, &lines)),
                SearchOutcome::Filtered(_) => panic!("empty query must not filter"),
            }
        }
        assert_eq!(s.cached_queries(), 0);
    }

    #[test]
    fn test_no_match_is_filtered_and_empty() {
        let mut s = Searcher::new(table(&["a", "b"]), MatchMode::Substring);
        let outcome = s.search(Some("zzz"));
        assert!(outcome.is_filtered());
        assert_eq!(outcome.total(), Some(0));
        assert!(outcome.lines().is_empty());
    }

    #[test]
    fn test_results_are_memoized_per_query() {
        let mut s = Searcher::new(table(&["one", "two", "three"]), MatchMode::Substring);
        let first = s.search(Some("t"));
        let second = s.search(Some("t"));
        match (first, second) {
            (SearchOutcome::Filtered(a), SearchOutcome::Filtered(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected filtered outcomes"),
        }
        s.search(Some("T"));
        assert_eq!(s.cached_queries(), 2);
    }

    #[test]
    fn test_total_and_result_bounds() {
        let texts: Vec<String> = (0..50)
            .map(|i| if i % 7 == 0 { format!("Elizabeth {i}") } else { format!("row {i}") })
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut s = Searcher::new(table(&refs), MatchMode::Substring);
        let outcome = s.search(Some("elizabeth"));
        let total = outcome.total().unwrap();
        let expected = refs.iter().filter(|t| t.to_lowercase().contains("elizabeth")).count();
        assert_eq!(total, expected);
        assert!(outcome.lines().len() >= total);
        assert!(outcome.lines().len() <= 3 * total);
        let nums: Vec<usize> = outcome.lines().iter().map(|l| l.line_num).collect();
        assert!(nums.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unicode_case_folding() {
        let mut s = Searcher::new(table(&["x", "ÜBER ALLES", "y"]), MatchMode::Substring);
        assert_eq!(s.search(Some("über")).total(), Some(1));
    }

    #[test]
    fn test_regex_mode_uses_same_context_rules() {
        let mut s = Searcher::new(
            table(&["intro", "CHAPTER 1", "text", "text", "Chapter 2", "end"]),
            MatchMode::Regex,
        );
        let outcome = s.search(Some(r"^chapter \d"));
        assert_eq!(outcome.total(), Some(2));
        assert_eq!(
            result_texts(&outcome),
            vec!["intro", "CHAPTER 1", "text", "text", "Chapter 2", "end"]
        );
    }

    #[test]
    fn test_single_line_table() {
        let mut s = Searcher::new(table(&["only match"]), MatchMode::Substring);
        let outcome = s.search(Some("match"));
        assert_eq!(result_texts(&outcome), vec!["only match"]);
    }
}
