/// Integration tests for the rust-reader App using egui_kittest.
///
/// These tests exercise the full `eframe::App::update` loop through AccessKit queries.
mod common;

use egui_kittest::kittest::Queryable;
use rust_reader_core::MemorySource;
use rust_reader_ui::{LoadPhase, StartupArgs};

use common::{book, create_harness, create_harness_with, step_until};

// ── A. App Initialization ──────────────────────────────────────────────────

#[test]
fn test_app_initial_state() {
    let (mut harness, _dir) = create_harness();
    harness.step();
    let app = harness.state();
    assert_eq!(app.status.phase, LoadPhase::Empty);
    assert!(app.source_input.is_empty());
    assert!(app.search_input.is_empty());
    assert!(!app.has_pending_source());
}

#[test]
fn test_status_bar_shows_no_document() {
    let (mut harness, _dir) = create_harness();
    harness.step();
    harness.get_by_label("No document");
}

#[test]
fn test_startup_font_size_is_clamped() {
    let args = StartupArgs {
        font_size: Some(500.0),
        ..Default::default()
    };
    let (harness, _dir) = create_harness_with(MemorySource::new(), args);
    assert!((harness.state().config.font.size - 96.0).abs() < f32::EPSILON);
}

#[test]
fn test_effective_font_uses_theme_text_color() {
    let (harness, _dir) = create_harness();
    let app = harness.state();
    assert_eq!(app.effective_font().fill_style, app.theme.text_color);
    assert!((app.effective_font().size - app.config.font.size).abs() < f32::EPSILON);
}

// ── B. Loading ─────────────────────────────────────────────────────────────

#[test]
fn test_open_source_loads_document() {
    let source = MemorySource::new().with("book", book(3));
    let (mut harness, _dir) = create_harness_with(source, StartupArgs::default());

    harness.state_mut().open_source("book");
    assert!(harness.state().has_pending_source());
    step_until(&mut harness, |app| app.status.phase == LoadPhase::Ready);

    let app = harness.state();
    assert!(!app.has_pending_source());
    assert_eq!(app.status.logical_lines, 3);
    assert_eq!(app.config.last_source, "book");
    harness.get_by_label("3 lines");
}

#[test]
fn test_startup_source_is_opened() {
    let source = MemorySource::new().with("book", book(12));
    let args = StartupArgs {
        source: Some("book".into()),
        ..Default::default()
    };
    let (mut harness, _dir) = create_harness_with(source, args);
    assert_eq!(harness.state().source_input, "book");
    step_until(&mut harness, |app| app.status.phase == LoadPhase::Ready);
    harness.get_by_label("12 lines");
}

#[test]
fn test_blank_source_is_ignored() {
    let (mut harness, _dir) = create_harness();
    harness.state_mut().open_source("   ");
    assert!(!harness.state().has_pending_source());
}

#[test]
fn test_missing_source_reports_failure() {
    let (mut harness, _dir) = create_harness();
    harness.state_mut().open_source("missing.txt");
    step_until(&mut harness, |app| app.status.phase == LoadPhase::Failed);

    let status = &harness.state().status;
    assert!(status
        .error
        .as_deref()
        .is_some_and(|e| e.contains("missing.txt")));
    harness.get_by_label("Failed: missing.txt");
}

// ── C. Search ──────────────────────────────────────────────────────────────

#[test]
fn test_startup_search_filters_after_load() {
    let source = MemorySource::new().with("book", book(40));
    let args = StartupArgs {
        source: Some("book".into()),
        search: Some("line 20 ".into()),
        ..Default::default()
    };
    let (mut harness, _dir) = create_harness_with(source, args);
    step_until(&mut harness, |app| app.status.matches.is_some());

    let status = &harness.state().status;
    assert_eq!(status.matches, Some(1));
    assert_eq!(status.shown, 3);
    harness.get_by_label("1 match");
}

// ── D. Preferences ─────────────────────────────────────────────────────────

#[test]
fn test_font_size_change_is_clamped() {
    let source = MemorySource::new().with("book", book(5));
    let (mut harness, _dir) = create_harness_with(source, StartupArgs::default());
    harness.state_mut().open_source("book");
    step_until(&mut harness, |app| app.status.phase == LoadPhase::Ready);

    harness.state_mut().set_font_size(2.0);
    assert!((harness.state().config.font.size - 6.0).abs() < f32::EPSILON);
    harness.state_mut().set_font_size(24.0);
    assert!((harness.state().effective_font().size - 24.0).abs() < f32::EPSILON);
    harness.step();
    assert_eq!(harness.state().status.phase, LoadPhase::Ready);
}

#[test]
fn test_regex_toggle_updates_config() {
    let (mut harness, _dir) = create_harness();
    harness.state_mut().set_search_regex(true);
    assert!(harness.state().config.search_regex);
}
