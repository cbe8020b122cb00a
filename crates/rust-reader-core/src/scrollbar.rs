//! Scrollbar controller: scroll offset clamping, thumb geometry, and thumb dragging.
//!
//! Offsets are non-positive: `0` shows the top of the content and more
//! negative values scroll further down. The valid range is
//! `[min_scroll, 0]` with `min_scroll = min(canvas_height - text_height - thumb_height, 0)`.

use rust_reader_config::{HexColor, ReaderColors};

use crate::surface::{Rect, Surface};

/// Pointer event payload forwarded from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
    /// Bitmask of pressed buttons (bit 0 = primary), as in DOM `MouseEvent.buttons`.
    pub buttons: u8,
    /// Vertical movement since the previous pointer event.
    pub movement_y: f32,
}

impl PointerInput {
    pub fn any_button(&self) -> bool {
        self.buttons != 0
    }
}

/// Scroll geometry for one document view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub scroll_offset: f32,
    pub text_height: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub thumb_width: f32,
    pub thumb_height: f32,
    pub dragging: bool,
    /// Content pixels per pixel of thumb movement.
    pub drag_scale: f32,
}

impl ScrollState {
    /// Lowest allowed offset (the bottom of the content).
    pub fn min_scroll(&self) -> f32 {
        (-self.text_height + self.canvas_height - self.thumb_height).min(0.0)
    }

    pub fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(self.min_scroll(), 0.0)
    }

    /// Scroll position as a fraction in `[0, 1]`; `0` when nothing can scroll.
    pub fn scroll_fraction(&self) -> f32 {
        let min = self.min_scroll();
        if min == 0.0 {
            0.0
        } else {
            self.scroll_offset / min
        }
    }
}

/// Thumb interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Scrollbar state machine over a [`ScrollState`].
///
/// Mutators return `true` when the scroll offset changed, i.e. when the
/// owner has to re-render the text.
#[derive(Debug, Clone)]
pub struct Scrollbar {
    state: ScrollState,
}

impl Scrollbar {
    pub fn new(
        canvas_width: f32,
        canvas_height: f32,
        thumb_width: f32,
        thumb_height: f32,
        drag_scale: f32,
    ) -> Self {
        Self {
            state: ScrollState {
                scroll_offset: 0.0,
                text_height: 0.0,
                canvas_width,
                canvas_height,
                thumb_width,
                thumb_height,
                dragging: false,
                drag_scale,
            },
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn offset(&self) -> f32 {
        self.state.scroll_offset
    }

    pub fn min_scroll(&self) -> f32 {
        self.state.min_scroll()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    pub fn drag_state(&self) -> DragState {
        if self.state.dragging {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    /// Whether the content is taller than the viewport.
    pub fn can_scroll(&self) -> bool {
        self.min_scroll() < 0.0
    }

    fn set_clamped(&mut self, offset: f32) -> bool {
        let clamped = self.state.clamp(offset);
        let changed = (clamped - self.state.scroll_offset).abs() > f32::EPSILON;
        self.state.scroll_offset = clamped;
        changed
    }

    /// Updates the total content height and re-clamps the offset.
    pub fn set_text_height(&mut self, height: f32) -> bool {
        self.state.text_height = height.max(0.0);
        if !self.can_scroll() {
            self.state.dragging = false;
        }
        self.set_clamped(self.state.scroll_offset)
    }

    /// Updates the viewport size and re-clamps the offset.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) -> bool {
        self.state.canvas_width = width;
        self.state.canvas_height = height;
        if !self.can_scroll() {
            self.state.dragging = false;
        }
        self.set_clamped(self.state.scroll_offset)
    }

    pub fn set_drag_scale(&mut self, scale: f32) {
        self.state.drag_scale = scale;
    }

    /// Scrolls by `delta` pixels; positive values move further down the content.
    pub fn apply_scroll_delta(&mut self, delta: f32) -> bool {
        if !delta.is_finite() {
            return false;
        }
        self.set_clamped(self.state.scroll_offset - delta)
    }

    /// Jumps to `offset`, clamped into range.
    pub fn set_scroll_offset(&mut self, offset: f32) -> bool {
        if !offset.is_finite() {
            return false;
        }
        self.set_clamped(offset)
    }

    /// Current thumb bounds, pinned to the trailing edge.
    pub fn thumb_rect(&self) -> Rect {
        let s = &self.state;
        let travel = (s.canvas_height - s.thumb_height).max(0.0);
        Rect::new(
            s.canvas_width - s.thumb_width,
            travel * s.scroll_fraction(),
            s.thumb_width,
            s.thumb_height,
        )
    }

    /// Starts a drag when the press lands on the thumb. Returns true if it did.
    pub fn pointer_down(&mut self, input: &PointerInput) -> bool {
        if self.state.dragging || !self.can_scroll() {
            return false;
        }
        if self.thumb_rect().contains(input.x, input.y) {
            self.state.dragging = true;
            tracing::trace!("Thumb drag started at y={}", input.y);
            return true;
        }
        false
    }

    /// Ends any drag, wherever the release happens. Returns true if one ended.
    pub fn pointer_up(&mut self, _input: &PointerInput) -> bool {
        std::mem::replace(&mut self.state.dragging, false)
    }

    /// Translates vertical movement into scrolling while dragging with a
    /// button held. The pointer may leave the thumb without ending the drag.
    pub fn pointer_move(&mut self, input: &PointerInput) -> bool {
        if !self.state.dragging || !input.any_button() {
            return false;
        }
        self.apply_scroll_delta(input.movement_y * self.state.drag_scale)
    }

    /// Draws the track and thumb.
    pub fn draw(&self, surface: &mut dyn Surface, colors: &ReaderColors, outline: HexColor) {
        let s = &self.state;
        let track = Rect::new(s.canvas_width - s.thumb_width, 0.0, s.thumb_width, s.canvas_height);
        surface.fill_rect(track, colors.scrollbar_track);

        let thumb = self.thumb_rect();
        let fill = if s.dragging {
            colors.thumb_active
        } else {
            colors.thumb_idle
        };
        surface.fill_rect(thumb, fill);
        surface.stroke_rect(thumb, outline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// textHeight=1000, canvasHeight=600, thumbHeight=100 => minScroll = -500.
    fn scenario() -> Scrollbar {
        let mut bar = Scrollbar::new(800.0, 600.0, 10.0, 100.0, 1.0);
        bar.set_text_height(1000.0);
        bar
    }

    fn press(x: f32, y: f32) -> PointerInput {
        PointerInput {
            x,
            y,
            buttons: 1,
            movement_y: 0.0,
        }
    }

    fn drag(movement_y: f32) -> PointerInput {
        PointerInput {
            x: 0.0,
            y: 0.0,
            buttons: 1,
            movement_y,
        }
    }

    #[test]
    fn test_min_scroll_scenario() {
        assert!((scenario().min_scroll() + 500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_negative_delta_at_top_stays_at_zero() {
        let mut bar = scenario();
        assert!(!bar.apply_scroll_delta(-100.0));
        assert!(bar.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn test_huge_delta_saturates_at_min_scroll() {
        let mut bar = scenario();
        assert!(bar.apply_scroll_delta(100_000.0));
        assert!((bar.offset() + 500.0).abs() < f32::EPSILON);
        bar.apply_scroll_delta(-100_000.0);
        assert!(bar.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn test_offset_stays_in_range_for_any_sequence() {
        let mut bar = scenario();
        for delta in [30.0, -7.5, 450.0, 1e9, -3.0, -1e9, 250.0, f32::NAN, 12.0] {
            bar.apply_scroll_delta(delta);
            assert!(bar.offset() <= 0.0 && bar.offset() >= bar.min_scroll());
        }
    }

    #[test]
    fn test_text_height_change_reclamps() {
        let mut bar = scenario();
        bar.apply_scroll_delta(400.0);
        assert!(bar.set_text_height(800.0));
        // 600 - 800 - 100 = -300
        assert!((bar.offset() + 300.0).abs() < f32::EPSILON);
        assert!(!bar.set_text_height(5000.0));
        assert!((bar.offset() + 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_canvas_resize_reclamps() {
        let mut bar = scenario();
        bar.apply_scroll_delta(500.0);
        bar.set_canvas_size(800.0, 1200.0);
        assert!(bar.offset().abs() < f32::EPSILON);
        assert!(!bar.can_scroll());
    }

    #[test]
    fn test_set_scroll_offset_clamps() {
        let mut bar = scenario();
        bar.set_scroll_offset(-250.0);
        assert!((bar.offset() + 250.0).abs() < f32::EPSILON);
        bar.set_scroll_offset(40.0);
        assert!(bar.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn test_thumb_tracks_scroll_fraction() {
        let mut bar = scenario();
        assert_eq!(bar.thumb_rect(), Rect::new(790.0, 0.0, 10.0, 100.0));
        bar.set_scroll_offset(-250.0);
        assert!((bar.thumb_rect().y - 250.0).abs() < 1e-3);
        bar.set_scroll_offset(-500.0);
        assert!((bar.thumb_rect().y - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_content_that_fits_pins_thumb_and_disables_drag() {
        let mut bar = Scrollbar::new(800.0, 600.0, 10.0, 100.0, 1.0);
        bar.set_text_height(200.0);
        assert!(!bar.can_scroll());
        assert!(bar.thumb_rect().y.abs() < f32::EPSILON);
        assert!(!bar.pointer_down(&press(795.0, 10.0)));
        assert!(!bar.is_dragging());
    }

    #[test]
    fn test_press_outside_thumb_does_not_drag() {
        let mut bar = scenario();
        assert!(!bar.pointer_down(&press(100.0, 10.0)));
        assert!(!bar.pointer_down(&press(795.0, 300.0)));
        assert!(!bar.pointer_move(&drag(50.0)));
        assert!(bar.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn test_drag_moves_content_one_to_one() {
        let mut bar = scenario();
        assert!(bar.pointer_down(&press(795.0, 50.0)));
        assert!(bar.pointer_move(&drag(40.0)));
        assert!((bar.offset() + 40.0).abs() < f32::EPSILON);
        // Leaving the thumb keeps the drag alive
        assert!(bar.pointer_move(&PointerInput {
            x: 10.0,
            y: 590.0,
            buttons: 1,
            movement_y: 10.0,
        }));
        assert!((bar.offset() + 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_move_without_button_is_ignored() {
        let mut bar = scenario();
        bar.pointer_down(&press(795.0, 50.0));
        let released = PointerInput {
            buttons: 0,
            movement_y: 40.0,
            ..Default::default()
        };
        assert!(!bar.pointer_move(&released));
        assert!(bar.is_dragging());
    }

    #[test]
    fn test_release_anywhere_ends_drag() {
        let mut bar = scenario();
        bar.pointer_down(&press(795.0, 50.0));
        assert_eq!(bar.drag_state(), DragState::Dragging);
        assert!(bar.pointer_up(&PointerInput::default()));
        assert_eq!(bar.drag_state(), DragState::Idle);
        assert!(!bar.pointer_move(&drag(40.0)));
        assert!(!bar.pointer_up(&PointerInput::default()));
    }

    #[test]
    fn test_drag_scale() {
        let mut bar = scenario();
        bar.set_drag_scale(2.5);
        bar.pointer_down(&press(795.0, 50.0));
        bar.pointer_move(&drag(10.0));
        assert!((bar.offset() + 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_draw_emits_track_and_thumb() {
        use crate::surface::{DrawCommand, RecordingSurface};

        let bar = scenario();
        let mut surface = RecordingSurface::new();
        surface.clear(HexColor::BLACK);
        bar.draw(&mut surface, &ReaderColors::default(), HexColor::WHITE);
        surface.present();
        let frame = surface.take_frame().unwrap();
        assert!(frame.commands.contains(&DrawCommand::FillRect {
            rect: bar.thumb_rect(),
            color: ReaderColors::default().thumb_idle,
        }));
        assert!(frame.commands.contains(&DrawCommand::StrokeRect {
            rect: bar.thumb_rect(),
            color: HexColor::WHITE,
        }));
    }
}
