use std::sync::Arc;
use std::time::{Duration, Instant};

use egui_kittest::Harness;
use rust_reader_core::MemorySource;
use rust_reader_ui::{App, StartupArgs};
use tempfile::TempDir;

/// Creates a harness at 1024x768 reading from `source`, with its config in a temp dir.
pub fn create_harness_with(
    source: MemorySource,
    mut args: StartupArgs,
) -> (Harness<'static, App>, TempDir) {
    let dir = TempDir::new().unwrap();
    args.config_path = Some(dir.path().join("rust-reader.json"));
    let source = Arc::new(source);
    let harness = Harness::builder()
        .with_size(egui::Vec2::new(1024.0, 768.0))
        .build_eframe(move |cc| App::with_source(cc, args, source));
    (harness, dir)
}

/// Creates a harness with an empty source.
pub fn create_harness() -> (Harness<'static, App>, TempDir) {
    create_harness_with(MemorySource::new(), StartupArgs::default())
}

pub fn book(lines: usize) -> String {
    (1..=lines)
        .map(|n| format!("line {n} of the book"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Steps frames until `done` holds, since loading happens off the UI thread.
pub fn step_until(harness: &mut Harness<'static, App>, done: impl Fn(&App) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(harness.state()) {
        assert!(Instant::now() < deadline, "timed out waiting for app state");
        harness.step();
        std::thread::sleep(Duration::from_millis(10));
    }
    // One more frame so panels reflect the new state
    harness.step();
}
