//! Virtualized rendering of the active line sequence.
//!
//! Only rows intersecting the viewport are ever turned into draw calls, so
//! the cost of a frame is bounded by the viewport height, not the document.

use rust_reader_config::{FontConfig, ReaderColors, TextAlign, TextBaseline};

use crate::line::DisplayLine;
use crate::session::{Layout, Viewport};
use crate::surface::{Rect, Surface, TextStyle};

/// Horizontal padding around the text column.
pub const TEXT_INSET: f32 = 8.0;
/// Gap between a line number and the scrollbar track.
const GUTTER_PAD: f32 = 6.0;

/// Inclusive index range a viewport may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub first: usize,
    pub last: usize,
}

/// Computes the candidate row range for a scroll position.
///
/// `first = floor(-scroll_offset / row_height)` and
/// `last = ceil(viewport_height / row_height) + first`. The range is not
/// clipped to `len`; [`visible_rows`] does that while iterating.
pub fn visible_window(scroll_offset: f32, row_height: f32, viewport_height: f32) -> VisibleWindow {
    if row_height <= 0.0 || !row_height.is_finite() {
        return VisibleWindow { first: 0, last: 0 };
    }
    let first = (-scroll_offset / row_height).floor().max(0.0) as usize;
    let span = (viewport_height.max(0.0) / row_height).ceil() as usize;
    VisibleWindow {
        first,
        last: first + span,
    }
}

/// Yields `(index, y)` for each row that should be drawn.
///
/// Iteration stops at the end of the sequence or at the first row starting
/// below the viewport; rows lying entirely above it are skipped.
pub fn visible_rows(
    len: usize,
    scroll_offset: f32,
    row_height: f32,
    viewport_height: f32,
) -> impl Iterator<Item = (usize, f32)> {
    let window = visible_window(scroll_offset, row_height, viewport_height);
    let empty = row_height <= 0.0 || !row_height.is_finite();
    (window.first..=window.last)
        .take_while(move |&idx| !empty && idx < len)
        .map(move |idx| (idx, idx as f32 * row_height + scroll_offset))
        .take_while(move |&(_, y)| y <= viewport_height)
        .filter(move |&(_, y)| y >= -row_height)
}

/// Width available to wrapped text for a viewport.
pub fn text_column_width(viewport: &Viewport, layout: &Layout) -> f32 {
    (viewport.width - layout.gutter_width - layout.thumb_width - 2.0 * TEXT_INSET).max(0.0)
}

/// Vertical anchor of a text run inside a row starting at `top`.
fn anchor_y(top: f32, font: &FontConfig) -> f32 {
    let row = font.row_height();
    let leading = (row - font.size) / 2.0;
    match font.baseline {
        TextBaseline::Top => top + leading,
        TextBaseline::Middle => top + row / 2.0,
        TextBaseline::Alphabetic => top + leading + font.size * 0.8,
        TextBaseline::Bottom => top + leading + font.size,
    }
}

/// Draws the visible part of `lines` and returns the number of rows drawn.
///
/// Clears the surface first. Each row's text goes into the text column using
/// the font's fill color and alignment; its line number is right-aligned in
/// the trailing gutter in the muted line-number color.
pub fn render_lines(
    surface: &mut dyn Surface,
    lines: &[DisplayLine],
    scroll_offset: f32,
    font: &FontConfig,
    layout: &Layout,
    colors: &ReaderColors,
    viewport: &Viewport,
) -> usize {
    surface.clear(colors.background);

    let column = text_column_width(viewport, layout);
    let text_x = match font.align {
        TextAlign::Left => TEXT_INSET,
        TextAlign::Center => TEXT_INSET + column / 2.0,
        TextAlign::Right => TEXT_INSET + column,
    };
    let gutter_right = viewport.width - layout.thumb_width;
    let show_numbers = layout.gutter_width > GUTTER_PAD;
    if layout.gutter_width > 0.0 {
        surface.fill_rect(
            Rect::new(
                gutter_right - layout.gutter_width,
                0.0,
                layout.gutter_width,
                viewport.height,
            ),
            colors.gutter_bg,
        );
    }

    let body = TextStyle::body(font);
    let number_style = body
        .clone()
        .with_color(colors.line_number)
        .with_align(TextAlign::Right);

    let mut drawn = 0;
    for (idx, top) in visible_rows(lines.len(), scroll_offset, font.row_height(), viewport.height) {
        let line = &lines[idx];
        let y = anchor_y(top, font);
        if !line.text.is_empty() {
            surface.fill_text(&line.text, text_x, y, Some(column), &body);
        }
        if show_numbers {
            surface.fill_text(
                &line.line_num.to_string(),
                gutter_right - GUTTER_PAD,
                y,
                Some(layout.gutter_width - GUTTER_PAD),
                &number_style,
            );
        }
        drawn += 1;
    }
    drawn
}

/// Draws `message` centered in the viewport. Does not clear.
pub fn render_status(
    surface: &mut dyn Surface,
    message: &str,
    font: &FontConfig,
    colors: &ReaderColors,
    viewport: &Viewport,
) {
    let style = TextStyle::body(font)
        .with_color(colors.status_text)
        .with_align(TextAlign::Center)
        .with_baseline(TextBaseline::Middle);
    surface.fill_text(
        message,
        viewport.width / 2.0,
        viewport.height / 2.0,
        Some((viewport.width - 2.0 * TEXT_INSET).max(0.0)),
        &style,
    );
}
