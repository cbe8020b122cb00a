/// Theme definitions: reader canvas colors, UI colors, and built-in theme presets.
use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Colors for the reader canvas (page, line-number gutter, scrollbar, status text).
///
/// Body text uses `FontConfig::fill_style`; these cover everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderColors {
    pub background: HexColor,
    pub line_number: HexColor,
    pub gutter_bg: HexColor,
    pub scrollbar_track: HexColor,
    pub thumb_idle: HexColor,
    pub thumb_active: HexColor,
    pub status_text: HexColor,
}

impl Default for ReaderColors {
    fn default() -> Self {
        Self {
            background: HexColor::rgb(30, 30, 30),
            line_number: HexColor::rgb(120, 120, 120),
            gutter_bg: HexColor::rgb(37, 37, 37),
            scrollbar_track: HexColor::rgb(35, 35, 35),
            thumb_idle: HexColor::rgb(80, 80, 80),
            thumb_active: HexColor::rgb(140, 140, 140),
            status_text: HexColor::rgb(170, 170, 170),
        }
    }
}

/// Colors for egui UI elements (panels, widgets, backgrounds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiColors {
    pub panel_fill: HexColor,
    pub window_fill: HexColor,
    pub faint_bg_color: HexColor,
    pub extreme_bg_color: HexColor,
    pub accent_color: HexColor,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            panel_fill: HexColor::rgb(43, 43, 43),
            window_fill: HexColor::rgb(43, 43, 43),
            faint_bg_color: HexColor::rgb(35, 35, 35),
            extreme_bg_color: HexColor::rgb(25, 25, 25),
            accent_color: HexColor::rgb(80, 180, 200),
        }
    }
}

/// A complete theme definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub dark_mode: bool,
    /// Body text color; overrides `FontConfig::fill_style` when the theme is applied.
    pub text_color: HexColor,
    #[serde(default)]
    pub reader: ReaderColors,
    #[serde(default)]
    pub ui: UiColors,
}

/// Built-in dark theme.
pub fn builtin_dark() -> ThemeDefinition {
    ThemeDefinition {
        name: "Dark".to_string(),
        dark_mode: true,
        text_color: HexColor::rgb(212, 212, 212),
        reader: ReaderColors::default(),
        ui: UiColors::default(),
    }
}

/// Built-in light theme.
pub fn builtin_light() -> ThemeDefinition {
    ThemeDefinition {
        name: "Light".to_string(),
        dark_mode: false,
        text_color: HexColor::rgb(30, 30, 30),
        reader: ReaderColors {
            background: HexColor::rgb(255, 255, 255),
            line_number: HexColor::rgb(130, 130, 130),
            gutter_bg: HexColor::rgb(240, 240, 240),
            scrollbar_track: HexColor::rgb(235, 235, 235),
            thumb_idle: HexColor::rgb(190, 190, 190),
            thumb_active: HexColor::rgb(130, 130, 130),
            status_text: HexColor::rgb(90, 90, 90),
        },
        ui: UiColors {
            panel_fill: HexColor::rgb(242, 242, 242),
            window_fill: HexColor::rgb(248, 248, 248),
            faint_bg_color: HexColor::rgb(235, 235, 235),
            extreme_bg_color: HexColor::rgb(255, 255, 255),
            accent_color: HexColor::rgb(0, 120, 215),
        },
    }
}

/// Warm paper-like theme for long reading sessions.
pub fn builtin_sepia() -> ThemeDefinition {
    ThemeDefinition {
        name: "Sepia".to_string(),
        dark_mode: false,
        text_color: HexColor::rgb(91, 70, 54),
        reader: ReaderColors {
            background: HexColor::rgb(244, 236, 216),
            line_number: HexColor::rgb(170, 150, 120),
            gutter_bg: HexColor::rgb(236, 226, 202),
            scrollbar_track: HexColor::rgb(232, 222, 198),
            thumb_idle: HexColor::rgb(196, 178, 148),
            thumb_active: HexColor::rgb(160, 138, 104),
            status_text: HexColor::rgb(120, 96, 72),
        },
        ui: UiColors {
            panel_fill: HexColor::rgb(236, 226, 202),
            window_fill: HexColor::rgb(244, 236, 216),
            faint_bg_color: HexColor::rgb(232, 222, 198),
            extreme_bg_color: HexColor::rgb(250, 244, 230),
            accent_color: HexColor::rgb(160, 110, 60),
        },
    }
}
