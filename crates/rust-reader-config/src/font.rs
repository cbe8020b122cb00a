//! Font and text layout settings shared by measurement and rendering.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Vertical anchor of a drawn text run relative to its y coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Alphabetic,
    Bottom,
}

/// Horizontal anchor of a drawn text run relative to its x coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font configuration for the reader canvas.
///
/// `size` is in logical pixels; `line_height` is a multiplier of `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    /// Optional TrueType/OpenType file used for measuring (and painting, in the UI).
    pub font_path: Option<PathBuf>,
    pub baseline: TextBaseline,
    pub align: TextAlign,
    pub fill_style: HexColor,
    pub stroke_style: HexColor,
    pub size: f32,
    pub line_height: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "monospace".to_string(),
            font_path: None,
            baseline: TextBaseline::Top,
            align: TextAlign::Left,
            fill_style: HexColor::rgb(212, 212, 212),
            stroke_style: HexColor::rgb(140, 140, 140),
            size: 16.0,
            line_height: 1.4,
        }
    }
}

impl FontConfig {
    /// CSS-style shorthand, e.g. `"16px monospace"`.
    pub fn font_string(&self) -> String {
        format!("{}px {}", self.size, self.family)
    }

    /// Height of one display row in logical pixels.
    pub fn row_height(&self) -> f32 {
        self.size * self.line_height
    }

    /// Returns true when switching from `self` to `other` changes pixel widths
    /// or row spacing, which invalidates the wrapped line table.
    pub fn affects_layout(&self, other: &FontConfig) -> bool {
        self.family != other.family
            || self.font_path != other.font_path
            || (self.size - other.size).abs() > f32::EPSILON
            || (self.line_height - other.line_height).abs() > f32::EPSILON
    }

    /// Clamps size and line height to usable ranges.
    pub fn sanitize(&mut self) {
        if !self.size.is_finite() {
            self.size = Self::default().size;
        }
        if !self.line_height.is_finite() {
            self.line_height = Self::default().line_height;
        }
        self.size = self.size.clamp(6.0, 96.0);
        self.line_height = self.line_height.clamp(1.0, 4.0);
        if self.family.trim().is_empty() {
            self.family = Self::default().family;
        }
    }
}

/// A partial font update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontUpdate {
    pub family: Option<String>,
    pub font_path: Option<Option<PathBuf>>,
    pub baseline: Option<TextBaseline>,
    pub align: Option<TextAlign>,
    pub fill_style: Option<HexColor>,
    pub stroke_style: Option<HexColor>,
    pub size: Option<f32>,
    pub line_height: Option<f32>,
}

impl FontUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a copy of `base` with every present field replaced.
    pub fn apply(&self, base: &FontConfig) -> FontConfig {
        let mut font = base.clone();
        if let Some(family) = &self.family {
            font.family = family.clone();
        }
        if let Some(path) = &self.font_path {
            font.font_path = path.clone();
        }
        if let Some(baseline) = self.baseline {
            font.baseline = baseline;
        }
        if let Some(align) = self.align {
            font.align = align;
        }
        if let Some(fill) = self.fill_style {
            font.fill_style = fill;
        }
        if let Some(stroke) = self.stroke_style {
            font.stroke_style = stroke;
        }
        if let Some(size) = self.size {
            font.size = size;
        }
        if let Some(line_height) = self.line_height {
            font.line_height = line_height;
        }
        font.sanitize();
        font
    }
}
