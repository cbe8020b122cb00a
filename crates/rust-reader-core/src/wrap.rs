//! Greedy line wrapping with original line numbers.
//!
//! The source text is split into logical lines on `'\n'`. Each logical line is
//! split into words on spaces and packed greedily into display rows no wider
//! than `max_width`. A word wider than `max_width` gets a row of its own and
//! is never split.

use crate::line::DisplayLine;
use crate::measure::MeasureText;

/// Wraps `text` into display lines no wider than `max_width`.
///
/// Always returns at least one line: empty input yields a single empty row
/// numbered 1, and every logical line (blank or whitespace-only included)
/// yields at least one row. Runs of spaces collapse to one; leading and
/// trailing spaces are dropped.
pub fn wrap_text(measure: &dyn MeasureText, max_width: f32, text: &str) -> Vec<DisplayLine> {
    let mut lines = Vec::new();
    let mut row: Vec<&str> = Vec::new();

    for (idx, logical) in text.split('\n').enumerate() {
        let line_num = idx + 1;
        row.clear();

        for word in logical.split(' ').filter(|w| !w.is_empty()) {
            row.push(word);
            if row.len() > 1 && measure.measure(&row) > max_width {
                row.pop();
                lines.push(DisplayLine::new(row.join(" "), line_num));
                row.clear();
                row.push(word);
            }
        }

        lines.push(DisplayLine::new(row.join(" "), line_num));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MonospaceMeasure;

    fn ten_px_per_char() -> MonospaceMeasure {
        MonospaceMeasure::new(10.0)
    }

    fn texts(lines: &[DisplayLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_empty_text_yields_single_empty_line() {
        let lines = wrap_text(&ten_px_per_char(), 100.0, "");
        assert_eq!(lines, vec![DisplayLine::new("", 1)]);
    }

    #[test]
    fn test_quick_brown_fox_scenario() {
        let m = ten_px_per_char();
        let lines = wrap_text(&m, 100.0, "The quick brown fox\njumps");
        assert_eq!(
            texts(&lines),
            vec!["The quick", "brown fox", "jumps"]
        );
        assert_eq!(
            lines.iter().map(|l| l.line_num).collect::<Vec<_>>(),
            vec![1, 1, 2]
        );
        for line in &lines {
            let words: Vec<&str> = line.text.split(' ').collect();
            assert!(m.measure(&words) <= 100.0);
        }
    }

    #[test]
    fn test_blank_logical_lines_are_preserved() {
        let lines = wrap_text(&ten_px_per_char(), 100.0, "a\n\nb\n");
        assert_eq!(texts(&lines), vec!["a", "", "b", ""]);
        assert_eq!(
            lines.iter().map(|l| l.line_num).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_whitespace_only_line_yields_one_row() {
        let lines = wrap_text(&ten_px_per_char(), 100.0, "    ");
        assert_eq!(lines, vec![DisplayLine::new("", 1)]);
    }

    #[test]
    fn test_overlong_word_is_not_split() {
        let lines = wrap_text(&ten_px_per_char(), 50.0, "a supercalifragilistic b");
        assert_eq!(texts(&lines), vec!["a", "supercalifragilistic", "b"]);
        assert!(lines.iter().all(|l| l.line_num == 1));
    }

    #[test]
    fn test_overlong_first_word_does_not_emit_empty_row() {
        let lines = wrap_text(&ten_px_per_char(), 30.0, "elephant ox");
        assert_eq!(texts(&lines), vec!["elephant", "ox"]);
    }

    #[test]
    fn test_non_positive_width_puts_one_word_per_row() {
        let lines = wrap_text(&ten_px_per_char(), 0.0, "one two three");
        assert_eq!(texts(&lines), vec!["one", "two", "three"]);
        let lines = wrap_text(&ten_px_per_char(), -5.0, "one two");
        assert_eq!(texts(&lines), vec!["one", "two"]);
    }

    #[test]
    fn test_consecutive_spaces_collapse() {
        let lines = wrap_text(&ten_px_per_char(), 1000.0, "  a   b  c ");
        assert_eq!(texts(&lines), vec!["a b c"]);
    }

    #[test]
    fn test_rejoining_rows_restores_logical_line() {
        let text = "It is a truth universally acknowledged, that a single man in\n\
                    possession of a good fortune, must be in want of a wife.";
        let lines = wrap_text(&ten_px_per_char(), 120.0, text);
        for (idx, original) in text.split('\n').enumerate() {
            let rejoined: Vec<&str> = lines
                .iter()
                .filter(|l| l.line_num == idx + 1)
                .map(|l| l.text.as_str())
                .collect();
            let normalized: Vec<&str> = original.split_whitespace().collect();
            assert_eq!(rejoined.join(" "), normalized.join(" "));
        }
    }

    #[test]
    fn test_width_invariant_holds_except_for_single_words() {
        let m = ten_px_per_char();
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
                    eiusmod tempor incididunt ut labore et dolore magna aliqua.\n\
                    Pneumonoultramicroscopicsilicovolcanoconiosis is long.";
        for width in [10.0, 45.0, 80.0, 150.0, 400.0] {
            for line in wrap_text(&m, width, text) {
                let words: Vec<&str> = line.text.split(' ').collect();
                assert!(
                    m.measure(&words) <= width || words.len() == 1,
                    "row {:?} too wide for {width}",
                    line.text
                );
            }
        }
    }

    #[test]
    fn test_unicode_words() {
        let lines = wrap_text(&ten_px_per_char(), 60.0, "café naïve 日本語 über");
        assert_eq!(texts(&lines), vec!["café", "naïve", "日本語", "über"]);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let m = ten_px_per_char();
        let text = "alpha beta gamma\ndelta epsilon";
        assert_eq!(wrap_text(&m, 70.0, text), wrap_text(&m, 70.0, text));
    }
}
