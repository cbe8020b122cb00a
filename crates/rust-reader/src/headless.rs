//! Window-less mode: load, wrap, filter, and print the visible rows.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use rust_reader_config::{ReaderConfig, ThemeDefinition};
use rust_reader_core::{
    load_text, DefaultSource, DisplayLine, Layout, MatchMode, Session, SessionStatus, TextSource,
    Viewport,
};

use crate::Cli;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessOptions {
    pub source: String,
    pub search: Option<String>,
    pub font_size: Option<f32>,
    pub config_path: Option<PathBuf>,
    pub viewport: Viewport,
    pub scroll: f32,
    pub json: bool,
}

impl HeadlessOptions {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        Self {
            source: cli.source.clone().unwrap_or_default(),
            search: cli.search.clone(),
            font_size: cli.font_size,
            config_path: cli.config.clone(),
            viewport: Viewport::new(cli.width, cli.height, 1.0),
            scroll: cli.scroll,
            json: cli.json,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a str,
    status: SessionStatus,
    rows: Vec<&'a DisplayLine>,
}

/// Theme for a window-less run: "System" has no desktop to ask, so it reads as Dark.
fn headless_theme(config: &ReaderConfig) -> ThemeDefinition {
    let name = if config.current_theme == "System" {
        "Dark"
    } else {
        config.current_theme.as_str()
    };
    config
        .find_theme(name)
        .cloned()
        .unwrap_or_else(rust_reader_config::theme::builtin_dark)
}

/// Runs headless mode against local files and `http(s)` URLs.
pub fn run(options: &HeadlessOptions, out: &mut impl Write) -> Result<()> {
    let source = DefaultSource::new()?;
    run_with_source(options, &source, out)
}

fn run_with_source(
    options: &HeadlessOptions,
    source: &dyn TextSource,
    out: &mut impl Write,
) -> Result<()> {
    let config = match &options.config_path {
        Some(path) => ReaderConfig::load_or_create(path),
        None => ReaderConfig::load_or_create(&ReaderConfig::config_path()),
    };
    let theme = headless_theme(&config);
    let mut font = config.font.clone();
    if let Some(size) = options.font_size {
        font.size = size;
    }
    font.sanitize();

    let text = load_text(source, &options.source)?;
    let mut session = Session::new(
        text,
        font,
        options.viewport,
        Layout::from_config(&config),
        theme.reader,
        MatchMode::from_regex_flag(config.search_regex),
    );
    if let Some(query) = &options.search {
        session.set_search_query(query);
    }
    if options.scroll != 0.0 {
        session.scroll(options.scroll);
    }

    let rows = session.visible_lines();
    if options.json {
        let report = Report {
            source: &options.source,
            status: session.status(),
            rows,
        };
        serde_json::to_writer_pretty(&mut *out, &report).context("failed to write report")?;
        writeln!(out)?;
    } else {
        for row in rows {
            writeln!(out, "{}\t{}", row.line_num, row.text)?;
        }
    }
    Ok(())
}
