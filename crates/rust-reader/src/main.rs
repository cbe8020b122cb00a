#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod headless;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// A virtualized plain-text reader with contextual search, built with Rust and egui.
#[derive(Parser, Debug)]
#[command(name = "rust-reader", version, about)]
struct Cli {
    /// URL or file path to open on startup.
    source: Option<String>,

    /// Filter lines on startup.
    #[arg(long)]
    search: Option<String>,

    /// Font size in logical pixels.
    #[arg(long = "font-size")]
    font_size: Option<f32>,

    /// Config file to use instead of the per-user default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the visible rows to stdout instead of opening a window.
    #[arg(long, requires = "source")]
    headless: bool,

    /// Viewport width for --headless.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height for --headless.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Pixels to scroll down before printing (--headless).
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Print a JSON report instead of plain rows (--headless).
    #[arg(long, requires = "headless")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; headless output owns stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.headless {
        let options = headless::HeadlessOptions::from_cli(&cli);
        let stdout = std::io::stdout();
        return headless::run(&options, &mut stdout.lock());
    }

    tracing::info!("Starting rust-reader");

    let startup_args = rust_reader_ui::StartupArgs {
        source: cli.source,
        search: cli.search,
        font_size: cli.font_size,
        config_path: cli.config,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "rust-reader",
        native_options,
        Box::new(move |cc| Ok(Box::new(rust_reader_ui::App::new(cc, startup_args)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
