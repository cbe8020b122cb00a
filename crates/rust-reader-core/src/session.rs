//! One loaded document and everything derived from it.
//!
//! A [`Session`] owns the raw text, the wrapped line table, the searcher
//! (and with it the query memo), the active line sequence, and the
//! scrollbar. Only the coordinator thread ever touches it.

use std::sync::Arc;
use std::time::Instant;

use rust_reader_config::{FontConfig, FontUpdate, ReaderColors, ReaderConfig};
use serde::Serialize;

use crate::line::{logical_line_count, DisplayLine};
use crate::measure::{measure_for, MeasureText};
use crate::render::{render_lines, render_status, text_column_width, visible_rows};
use crate::scrollbar::{PointerInput, Scrollbar};
use crate::search::{MatchMode, SearchOutcome, Searcher};
use crate::surface::Surface;
use crate::wrap::wrap_text;

/// Fixed chrome sizes around the text column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Line-number gutter on the trailing edge, left of the scrollbar.
    pub gutter_width: f32,
    pub thumb_width: f32,
    pub thumb_height: f32,
    pub drag_scale: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            gutter_width: 56.0,
            thumb_width: 12.0,
            thumb_height: 60.0,
            drag_scale: 1.0,
        }
    }
}

impl Layout {
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            gutter_width: config.gutter_width,
            thumb_width: config.thumb_width,
            thumb_height: config.thumb_height,
            drag_scale: config.drag_scale,
        }
    }
}

/// Drawing surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }
}

/// Snapshot of a session for status bars and the headless dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    /// Rows in the full wrapped line table.
    pub line_count: usize,
    pub logical_lines: usize,
    /// Rows in the sequence currently displayed.
    pub active_lines: usize,
    pub query: Option<String>,
    /// Direct matches for `query`, `None` when unfiltered.
    pub total_matches: Option<usize>,
    pub scroll_offset: f32,
    pub min_scroll: f32,
}

pub struct Session {
    text: String,
    font: FontConfig,
    layout: Layout,
    colors: ReaderColors,
    viewport: Viewport,
    mode: MatchMode,
    measure: Box<dyn MeasureText>,
    lines: Arc<[DisplayLine]>,
    searcher: Searcher,
    query: Option<String>,
    active: SearchOutcome,
    scrollbar: Scrollbar,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("font", &self.font)
            .field("viewport", &self.viewport)
            .field("lines", &self.lines.len())
            .field("query", &self.query)
            .field("scroll_offset", &self.scrollbar.offset())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wraps `text` for `viewport` and starts at the top, unfiltered.
    pub fn new(
        text: String,
        font: FontConfig,
        viewport: Viewport,
        layout: Layout,
        colors: ReaderColors,
        mode: MatchMode,
    ) -> Self {
        let measure = measure_for(&font);
        let lines: Arc<[DisplayLine]> =
            wrap_text(measure.as_ref(), text_column_width(&viewport, &layout), &text).into();
        let mut searcher = Searcher::new(Arc::clone(&lines), mode);
        let active = searcher.search(None);
        let scrollbar = Scrollbar::new(
            viewport.width,
            viewport.height,
            layout.thumb_width,
            layout.thumb_height,
            layout.drag_scale,
        );
        let mut session = Self {
            text,
            font,
            layout,
            colors,
            viewport,
            mode,
            measure,
            lines,
            searcher,
            query: None,
            active,
            scrollbar,
        };
        session.update_text_height();
        tracing::info!(
            "Session ready: {} logical lines, {} rows",
            logical_line_count(&session.lines),
            session.lines.len()
        );
        session
    }

    pub fn font(&self) -> &FontConfig {
        &self.font
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn colors(&self) -> &ReaderColors {
        &self.colors
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn match_mode(&self) -> MatchMode {
        self.mode
    }

    /// The full wrapped line table.
    pub fn lines(&self) -> &Arc<[DisplayLine]> {
        &self.lines
    }

    /// The sequence being displayed: the full table or the search results.
    pub fn active(&self) -> &SearchOutcome {
        &self.active
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn scrollbar(&self) -> &Scrollbar {
        &self.scrollbar
    }

    /// Rows of the active sequence inside the viewport, top to bottom.
    pub fn visible_lines(&self) -> Vec<&DisplayLine> {
        let active = self.active.lines();
        visible_rows(
            active.len(),
            self.scrollbar.offset(),
            self.font.row_height(),
            self.viewport.height,
        )
        .map(|(idx, _)| &active[idx])
        .collect()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            line_count: self.lines.len(),
            logical_lines: logical_line_count(&self.lines),
            active_lines: self.active.lines().len(),
            query: self.query.clone(),
            total_matches: self.active.total(),
            scroll_offset: self.scrollbar.offset(),
            min_scroll: self.scrollbar.min_scroll(),
        }
    }

    /// Applies a font update and/or a new viewport.
    ///
    /// Returns true when the line table was rebuilt. Paint-only font changes
    /// (colors, alignment, baseline) and resizes that keep the wrap width
    /// only update state.
    pub fn configure(&mut self, update: &FontUpdate, viewport: Option<Viewport>) -> bool {
        let font = update.apply(&self.font);
        let font_changed = font.affects_layout(&self.font);
        if font_changed {
            self.measure = measure_for(&font);
        }
        self.font = font;

        let mut width_changed = false;
        if let Some(viewport) = viewport {
            let before = text_column_width(&self.viewport, &self.layout);
            self.viewport = viewport;
            self.scrollbar.set_canvas_size(viewport.width, viewport.height);
            width_changed =
                (text_column_width(&self.viewport, &self.layout) - before).abs() > f32::EPSILON;
        }

        if font_changed || width_changed {
            self.rewrap();
            true
        } else {
            self.update_text_height();
            false
        }
    }

    pub fn set_colors(&mut self, colors: ReaderColors) {
        self.colors = colors;
    }

    /// Switches between substring and regex matching; drops the query memo.
    pub fn set_match_mode(&mut self, mode: MatchMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.searcher = Searcher::new(Arc::clone(&self.lines), mode);
        self.active = self.searcher.search(self.query.as_deref());
        self.update_text_height();
    }

    /// Filters to `text` (empty clears the filter) and scrolls to the top.
    pub fn set_search_query(&mut self, text: &str) -> &SearchOutcome {
        self.query = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        let started = Instant::now();
        self.active = self.searcher.search(self.query.as_deref());
        tracing::debug!(
            "Search {:?} -> {} rows in {:?}",
            self.query,
            self.active.lines().len(),
            started.elapsed()
        );
        self.update_text_height();
        self.scrollbar.set_scroll_offset(0.0);
        &self.active
    }

    pub fn scroll(&mut self, delta: f32) -> bool {
        self.scrollbar.apply_scroll_delta(delta)
    }

    pub fn set_scroll_offset(&mut self, offset: f32) -> bool {
        self.scrollbar.set_scroll_offset(offset)
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> bool {
        self.scrollbar.pointer_down(input)
    }

    pub fn pointer_up(&mut self, input: &PointerInput) -> bool {
        self.scrollbar.pointer_up(input)
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> bool {
        self.scrollbar.pointer_move(input)
    }

    /// Draws the visible rows, any "no matches" notice, and the scrollbar,
    /// then presents the frame.
    pub fn render(&self, surface: &mut dyn Surface) {
        let lines = self.active.lines();
        render_lines(
            surface,
            lines,
            self.scrollbar.offset(),
            &self.font,
            &self.layout,
            &self.colors,
            &self.viewport,
        );
        if let (Some(query), true) = (&self.query, lines.is_empty()) {
            render_status(
                surface,
                &format!("No matches for \"{query}\""),
                &self.font,
                &self.colors,
                &self.viewport,
            );
        }
        self.scrollbar
            .draw(surface, &self.colors, self.font.stroke_style);
        surface.present();
    }

    fn rewrap(&mut self) {
        let started = Instant::now();
        let width = text_column_width(&self.viewport, &self.layout);
        self.lines = wrap_text(self.measure.as_ref(), width, &self.text).into();
        self.searcher = Searcher::new(Arc::clone(&self.lines), self.mode);
        self.active = self.searcher.search(self.query.as_deref());
        self.update_text_height();
        tracing::debug!(
            "Re-wrapped to {} rows at width {width} in {:?}",
            self.lines.len(),
            started.elapsed()
        );
    }

    fn update_text_height(&mut self) {
        let height = self.active.lines().len() as f32 * self.font.row_height();
        self.scrollbar.set_text_height(height);
    }
}
