//! egui front end for the reader: toolbar, virtualized canvas, and status bar.

mod app;
mod canvas;

pub use app::{App, LoadPhase, ReaderStatus, StartupArgs, ThemeMode};
pub use canvas::{ReaderCanvas, RepaintingSurface};
