//! Reader canvas: forwards input to the coordinator and paints the frames it sends back.
//!
//! The canvas never lays out text itself. It reports its size, translates
//! wheel, keyboard, and primary-button events into coordinator messages, and
//! replays the latest [`Frame`] it has received.

mod painter;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::{Key, Pos2, Rect, Sense};

use rust_reader_config::HexColor;
use rust_reader_core::surface::{Rect as SurfaceRect, TextStyle};
use rust_reader_core::{
    Frame, Message, PointerInput, RecordingSurface, Surface, UpdateRequest, Viewport,
};

pub(crate) use painter::to_color32;

/// Fraction of the viewport scrolled by Page Up / Page Down.
const PAGE_FRACTION: f32 = 0.9;

/// Surface handed to the coordinator: records frames and wakes the UI on present.
pub struct RepaintingSurface {
    inner: RecordingSurface,
    ctx: egui::Context,
}

impl RepaintingSurface {
    pub fn new(sink: Sender<Frame>, ctx: egui::Context) -> Self {
        Self {
            inner: RecordingSurface::with_sink(sink),
            ctx,
        }
    }
}

impl Surface for RepaintingSurface {
    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.inner.resize(width, height, pixel_ratio);
    }

    fn clear(&mut self, color: HexColor) {
        self.inner.clear(color);
    }

    fn fill_rect(&mut self, rect: SurfaceRect, color: HexColor) {
        self.inner.fill_rect(rect, color);
    }

    fn stroke_rect(&mut self, rect: SurfaceRect, color: HexColor) {
        self.inner.stroke_rect(rect, color);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>, style: &TextStyle) {
        self.inner.fill_text(text, x, y, max_width, style);
    }

    fn present(&mut self) {
        self.inner.present();
        self.ctx.request_repaint();
    }
}

/// Central reader area.
pub struct ReaderCanvas {
    frames_tx: Sender<Frame>,
    frames_rx: Receiver<Frame>,
    latest: Option<Frame>,
    viewport: Option<Viewport>,
    /// A session surface has been handed out; resizes are now forwarded.
    attached: bool,
    /// The primary button went down inside the canvas and is still held.
    pressed: bool,
}

impl Default for ReaderCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderCanvas {
    pub fn new() -> Self {
        let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
        Self {
            frames_tx,
            frames_rx,
            latest: None,
            viewport: None,
            attached: false,
            pressed: false,
        }
    }

    /// Size of the canvas as of the last frame, once it has been laid out.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Returns true once a session surface has been handed out.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Most recent frame received from the coordinator.
    pub fn latest_frame(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    /// Creates the surface for a new session.
    pub fn make_surface(&mut self, ctx: &egui::Context) -> Box<dyn Surface> {
        self.attached = true;
        Box::new(RepaintingSurface::new(self.frames_tx.clone(), ctx.clone()))
    }

    /// Collects frames that arrived since the last call. Returns true if any did.
    pub fn receive_frames(&mut self) -> bool {
        let mut any = false;
        while let Ok(frame) = self.frames_rx.try_recv() {
            self.latest = Some(frame);
            any = true;
        }
        any
    }

    /// Lays out and paints the canvas; returns the messages its input produced.
    pub fn show(&mut self, ui: &mut egui::Ui, row_height: f32, background: HexColor) -> Vec<Message> {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;
        let mut messages = Vec::new();

        let viewport = Viewport::new(rect.width(), rect.height(), ui.ctx().pixels_per_point());
        if self.viewport != Some(viewport) {
            self.viewport = Some(viewport);
            if self.attached {
                messages.push(Message::Update(UpdateRequest {
                    viewport: Some(viewport),
                    ..Default::default()
                }));
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta);
            if scroll.y != 0.0 {
                messages.push(Message::Scroll { delta: -scroll.y });
            }
        }
        if !ui.ctx().wants_keyboard_input() {
            if let Some(delta) = ui.input(|i| keyboard_scroll(i, row_height, rect.height())) {
                messages.push(Message::Scroll { delta });
            }
        }
        self.pointer_messages(ui, rect, &mut messages);

        self.receive_frames();
        match &self.latest {
            Some(frame) => painter::paint_frame(&painter, rect, frame),
            None => {
                painter.rect_filled(rect, 0.0, to_color32(background));
            }
        }

        messages
    }

    fn pointer_messages(&mut self, ui: &egui::Ui, rect: Rect, out: &mut Vec<Message>) {
        let (pressed, released, down, delta, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.delta(),
                i.pointer.interact_pos(),
            )
        });
        let input = |p: Option<Pos2>, buttons: u8, movement_y: f32| {
            let local = p.map_or(egui::Vec2::ZERO, |p| p - rect.min);
            PointerInput {
                x: local.x,
                y: local.y,
                buttons,
                movement_y,
            }
        };

        if pressed && pos.is_some_and(|p| rect.contains(p)) {
            self.pressed = true;
            out.push(Message::PointerDown(input(pos, 1, 0.0)));
        }
        if self.pressed && down && delta.y != 0.0 {
            out.push(Message::PointerMove(input(pos, 1, delta.y)));
        }
        if self.pressed && released {
            self.pressed = false;
            out.push(Message::PointerUp(input(pos, 0, 0.0)));
        }
    }
}

/// Scroll distance for navigation keys pressed this frame.
fn keyboard_scroll(input: &egui::InputState, row_height: f32, page: f32) -> Option<f32> {
    let page = page * PAGE_FRACTION;
    if input.key_pressed(Key::ArrowDown) {
        Some(row_height)
    } else if input.key_pressed(Key::ArrowUp) {
        Some(-row_height)
    } else if input.key_pressed(Key::PageDown) || input.key_pressed(Key::Space) {
        Some(page)
    } else if input.key_pressed(Key::PageUp) {
        Some(-page)
    } else if input.key_pressed(Key::Home) {
        Some(f32::MIN)
    } else if input.key_pressed(Key::End) {
        Some(f32::MAX)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repainting_surface_forwards_frames() {
        let mut canvas = ReaderCanvas::new();
        let ctx = egui::Context::default();
        let mut surface = canvas.make_surface(&ctx);
        surface.resize(320.0, 240.0, 1.0);
        surface.clear(HexColor::BLACK);
        surface.present();

        assert!(canvas.receive_frames());
        let frame = canvas.latest_frame().unwrap();
        assert!((frame.width - 320.0).abs() < f32::EPSILON);
        assert!(!canvas.receive_frames());
    }

    #[test]
    fn test_latest_frame_wins() {
        let mut canvas = ReaderCanvas::new();
        let ctx = egui::Context::default();
        let mut surface = canvas.make_surface(&ctx);
        surface.present();
        surface.present();
        canvas.receive_frames();
        assert_eq!(canvas.latest_frame().map(|f| f.seq), Some(2));
    }
}
