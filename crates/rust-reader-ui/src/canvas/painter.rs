//! Replays recorded reader frames with the egui painter.

use eframe::egui;
use egui::{Align2, Color32, FontFamily, FontId, Pos2, Rect, Stroke, Vec2};

use rust_reader_config::{HexColor, TextAlign, TextBaseline};
use rust_reader_core::surface::{self, DrawCommand, TextStyle};
use rust_reader_core::Frame;

pub(crate) fn to_color32(c: HexColor) -> Color32 {
    Color32::from_rgba_premultiplied(c.r, c.g, c.b, c.a)
}

/// Maps canvas-style alignment onto an egui anchor.
pub(crate) fn anchor(align: TextAlign, baseline: TextBaseline) -> Align2 {
    let h = match align {
        TextAlign::Left => egui::Align::Min,
        TextAlign::Center => egui::Align::Center,
        TextAlign::Right => egui::Align::Max,
    };
    let v = match baseline {
        TextBaseline::Top => egui::Align::Min,
        TextBaseline::Middle => egui::Align::Center,
        TextBaseline::Alphabetic | TextBaseline::Bottom => egui::Align::Max,
    };
    Align2([h, v])
}

pub(crate) fn font_id(style: &TextStyle) -> FontId {
    let family = match style.family.as_ref() {
        "monospace" | "mono" | "Monospace" => FontFamily::Monospace,
        _ => FontFamily::Proportional,
    };
    FontId::new(style.size, family)
}

/// Horizontal extent a text run may occupy, given its anchor and max width.
pub(crate) fn text_span(x: f32, max_width: f32, align: TextAlign) -> (f32, f32) {
    match align {
        TextAlign::Left => (x, x + max_width),
        TextAlign::Center => (x - max_width / 2.0, x + max_width / 2.0),
        TextAlign::Right => (x - max_width, x),
    }
}

/// Rounds a logical coordinate to the nearest device pixel.
fn snap(v: f32, pixel_ratio: f32) -> f32 {
    (v * pixel_ratio).round() / pixel_ratio
}

fn to_rect(origin: Pos2, r: &surface::Rect, pixel_ratio: f32) -> Rect {
    Rect::from_min_size(
        Pos2::new(
            snap(origin.x + r.x, pixel_ratio),
            snap(origin.y + r.y, pixel_ratio),
        ),
        Vec2::new(r.width, r.height),
    )
}

/// Paints `frame` with its top-left corner at `canvas.min`.
pub(crate) fn paint_frame(painter: &egui::Painter, canvas: Rect, frame: &Frame) {
    let origin = canvas.min;
    let ratio = if frame.pixel_ratio > 0.0 {
        frame.pixel_ratio
    } else {
        1.0
    };

    for command in &frame.commands {
        match command {
            DrawCommand::Clear(color) => {
                painter.rect_filled(canvas, 0.0, to_color32(*color));
            }
            DrawCommand::FillRect { rect, color } => {
                painter.rect_filled(to_rect(origin, rect, ratio), 0.0, to_color32(*color));
            }
            DrawCommand::StrokeRect { rect, color } => {
                painter.rect_stroke(
                    to_rect(origin, rect, ratio),
                    0.0,
                    Stroke::new(1.0, to_color32(*color)),
                    egui::StrokeKind::Inside,
                );
            }
            DrawCommand::Text {
                text,
                x,
                y,
                max_width,
                style,
            } => {
                let pos = Pos2::new(snap(origin.x + x, ratio), snap(origin.y + y, ratio));
                let target = match max_width {
                    Some(width) => {
                        let (left, right) = text_span(pos.x, *width, style.align);
                        let clip = Rect::from_x_y_ranges(left..=right, canvas.y_range());
                        painter.with_clip_rect(clip.intersect(canvas))
                    }
                    None => painter.clone(),
                };
                target.text(
                    pos,
                    anchor(style.align, style.baseline),
                    text,
                    font_id(style),
                    to_color32(style.color),
                );
            }
        }
    }
}
