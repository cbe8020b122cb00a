//! Status bar: load phase, line counts, and search results.

use eframe::egui;
use egui::{Color32, RichText};

use rust_reader_core::ReaderEvent;

use super::App;

/// Where the current document is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

/// What the status bar shows, folded from coordinator events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderStatus {
    pub source: Option<String>,
    pub phase: LoadPhase,
    pub display_lines: usize,
    pub logical_lines: usize,
    /// Direct matches for the active query; `None` when unfiltered.
    pub matches: Option<usize>,
    /// Rows displayed under the active filter.
    pub shown: usize,
    pub error: Option<String>,
    pub disposed: bool,
}

impl ReaderStatus {
    pub fn apply(&mut self, event: &ReaderEvent) {
        match event {
            ReaderEvent::Loading { source } => {
                self.source = Some(source.clone());
                self.phase = LoadPhase::Loading;
                self.error = None;
            }
            ReaderEvent::Loaded {
                source,
                display_lines,
                logical_lines,
            } => {
                self.source = Some(source.clone());
                self.phase = LoadPhase::Ready;
                self.display_lines = *display_lines;
                self.logical_lines = *logical_lines;
                self.shown = *display_lines;
                self.matches = None;
            }
            ReaderEvent::LoadFailed { source, error } => {
                self.source = Some(source.clone());
                self.phase = LoadPhase::Failed;
                self.error = Some(error.clone());
                self.display_lines = 0;
                self.logical_lines = 0;
                self.shown = 0;
                self.matches = None;
            }
            ReaderEvent::Rewrapped { display_lines } => {
                if self.matches.is_none() {
                    self.shown = *display_lines;
                }
                self.display_lines = *display_lines;
            }
            ReaderEvent::SearchUpdated { total, shown, .. } => {
                self.matches = *total;
                self.shown = *shown;
            }
            ReaderEvent::Disposed => self.disposed = true,
        }
    }

    /// Short label for the load phase.
    pub fn phase_label(&self) -> String {
        match (self.phase, &self.source) {
            (LoadPhase::Empty, _) | (_, None) => "No document".to_string(),
            (LoadPhase::Loading, Some(s)) => format!("Loading {s}"),
            (LoadPhase::Ready, Some(s)) => s.clone(),
            (LoadPhase::Failed, Some(s)) => format!("Failed: {s}"),
        }
    }

    /// Label for the search result count, if a filter is active.
    pub fn match_label(&self) -> Option<String> {
        self.matches.map(|n| match n {
            0 => "No matches".to_string(),
            1 => "1 match".to_string(),
            n => format!("{n} matches"),
        })
    }
}

impl App {
    /// Renders the status bar at the bottom of the window.
    pub(crate) fn show_status_bar(&mut self, ui: &mut egui::Ui) {
        let status = &self.status;
        ui.horizontal(|ui| {
            ui.add(egui::Label::new(status.phase_label()).selectable(false));

            if status.phase == LoadPhase::Ready {
                ui.separator();
                ui.add(
                    egui::Label::new(format!("{} lines", status.logical_lines)).selectable(false),
                );
                ui.separator();
                ui.add(
                    egui::Label::new(format!("{} rows", status.display_lines)).selectable(false),
                );
            }

            if let Some(label) = status.match_label() {
                ui.separator();
                let color = if status.matches == Some(0) {
                    Color32::from_rgb(220, 120, 80)
                } else {
                    self.accent_color
                };
                ui.add(egui::Label::new(RichText::new(label).color(color)).selectable(false));
                ui.add(
                    egui::Label::new(format!("{} shown", status.shown)).selectable(false),
                );
            }

            if let Some(error) = &status.error {
                ui.separator();
                ui.add(
                    egui::Label::new(RichText::new(error).color(Color32::from_rgb(220, 80, 80)))
                        .truncate(),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(status: &mut ReaderStatus) {
        status.apply(&ReaderEvent::Loading {
            source: "book.txt".into(),
        });
        status.apply(&ReaderEvent::Loaded {
            source: "book.txt".into(),
            display_lines: 120,
            logical_lines: 100,
        });
    }

    #[test]
    fn test_initial_status_is_empty() {
        let status = ReaderStatus::default();
        assert_eq!(status.phase, LoadPhase::Empty);
        assert_eq!(status.phase_label(), "No document");
        assert_eq!(status.match_label(), None);
    }

    #[test]
    fn test_loading_then_loaded() {
        let mut status = ReaderStatus::default();
        status.apply(&ReaderEvent::Loading {
            source: "book.txt".into(),
        });
        assert_eq!(status.phase_label(), "Loading book.txt");

        loaded(&mut status);
        assert_eq!(status.phase, LoadPhase::Ready);
        assert_eq!(status.display_lines, 120);
        assert_eq!(status.logical_lines, 100);
        assert_eq!(status.shown, 120);
        assert_eq!(status.phase_label(), "book.txt");
    }

    #[test]
    fn test_failure_records_error() {
        let mut status = ReaderStatus::default();
        loaded(&mut status);
        status.apply(&ReaderEvent::LoadFailed {
            source: "gone.txt".into(),
            error: "no document at gone.txt".into(),
        });
        assert_eq!(status.phase, LoadPhase::Failed);
        assert_eq!(status.display_lines, 0);
        assert_eq!(status.error.as_deref(), Some("no document at gone.txt"));

        // A new load clears the error
        status.apply(&ReaderEvent::Loading {
            source: "book.txt".into(),
        });
        assert!(status.error.is_none());
    }

    #[test]
    fn test_search_updates_counts() {
        let mut status = ReaderStatus::default();
        loaded(&mut status);
        status.apply(&ReaderEvent::SearchUpdated {
            query: "whale".into(),
            total: Some(3),
            shown: 9,
        });
        assert_eq!(status.match_label().as_deref(), Some("3 matches"));
        assert_eq!(status.shown, 9);

        status.apply(&ReaderEvent::SearchUpdated {
            query: "ahab".into(),
            total: Some(1),
            shown: 3,
        });
        assert_eq!(status.match_label().as_deref(), Some("1 match"));

        status.apply(&ReaderEvent::SearchUpdated {
            query: String::new(),
            total: None,
            shown: 120,
        });
        assert_eq!(status.match_label(), None);
    }

    #[test]
    fn test_rewrap_keeps_filtered_count() {
        let mut status = ReaderStatus::default();
        loaded(&mut status);
        status.apply(&ReaderEvent::Rewrapped { display_lines: 150 });
        assert_eq!(status.shown, 150);

        status.apply(&ReaderEvent::SearchUpdated {
            query: "x".into(),
            total: Some(0),
            shown: 0,
        });
        assert_eq!(status.match_label().as_deref(), Some("No matches"));
        status.apply(&ReaderEvent::Rewrapped { display_lines: 90 });
        assert_eq!(status.display_lines, 90);
        assert_eq!(status.shown, 0);
    }

    #[test]
    fn test_disposed_flag() {
        let mut status = ReaderStatus::default();
        status.apply(&ReaderEvent::Disposed);
        assert!(status.disposed);
    }
}
