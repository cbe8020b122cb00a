//! Drawing surface abstraction.
//!
//! The coordinator thread owns exactly one [`Surface`] and draws onto it in
//! logical pixels. [`RecordingSurface`] turns the draw calls into a [`Frame`]
//! that another thread can replay (the egui canvas does this).

use std::sync::Arc;

use crossbeam_channel::Sender;
use rust_reader_config::{FontConfig, HexColor, TextAlign, TextBaseline};

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// How a text run is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: HexColor,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub size: f32,
    pub family: Arc<str>,
}

impl TextStyle {
    /// Body text style for `font`.
    pub fn body(font: &FontConfig) -> Self {
        Self {
            color: font.fill_style,
            align: font.align,
            baseline: font.baseline,
            size: font.size,
            family: Arc::from(font.family.as_str()),
        }
    }

    pub fn with_color(mut self, color: HexColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Canvas-like drawing target.
pub trait Surface: Send {
    /// Sets the logical size and device pixel ratio of the backing store.
    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32);
    /// Fills the whole surface, discarding previous content.
    fn clear(&mut self, color: HexColor);
    fn fill_rect(&mut self, rect: Rect, color: HexColor);
    fn stroke_rect(&mut self, rect: Rect, color: HexColor);
    /// Draws `text` anchored at `(x, y)` per `style.align`/`style.baseline`,
    /// clipped to `max_width` when given.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>, style: &TextStyle);
    /// Marks the end of a frame.
    fn present(&mut self);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(HexColor),
    FillRect {
        rect: Rect,
        color: HexColor,
    },
    StrokeRect {
        rect: Rect,
        color: HexColor,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        max_width: Option<f32>,
        style: TextStyle,
    },
}

/// A complete recorded frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Monotonic frame counter for the surface that produced it.
    pub seq: u64,
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Iterates the text runs in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, f32, f32, &TextStyle)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text {
                text, x, y, style, ..
            } => Some((text.as_str(), *x, *y, style)),
            _ => None,
        })
    }
}

/// Surface that records draw calls and hands each presented frame to a channel.
///
/// Without a channel, the latest frame is kept for [`RecordingSurface::take_frame`].
#[derive(Debug)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pixel_ratio: f32,
    seq: u64,
    commands: Vec<DrawCommand>,
    sink: Option<Sender<Frame>>,
    last: Option<Frame>,
}

impl RecordingSurface {
    /// Records frames and keeps the most recent one.
    pub fn new() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
            seq: 0,
            commands: Vec::new(),
            sink: None,
            last: None,
        }
    }

    /// Records frames and sends each presented frame to `sink`.
    pub fn with_sink(sink: Sender<Frame>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new()
        }
    }

    /// Takes the most recently presented frame (channel-less mode only).
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.last.take()
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.seq
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.width = width;
        self.height = height;
        self.pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
    }

    fn clear(&mut self, color: HexColor) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: HexColor) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: HexColor) {
        self.commands.push(DrawCommand::StrokeRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            max_width,
            style: style.clone(),
        });
    }

    fn present(&mut self) {
        self.seq += 1;
        let frame = Frame {
            seq: self.seq,
            width: self.width,
            height: self.height,
            pixel_ratio: self.pixel_ratio,
            commands: std::mem::take(&mut self.commands),
        };
        match &self.sink {
            Some(sink) => {
                // The receiving side may already be gone during shutdown.
                if sink.send(frame).is_err() {
                    tracing::debug!("Frame {} dropped: receiver closed", self.seq);
                }
            }
            None => self.last = Some(frame),
        }
    }
}
