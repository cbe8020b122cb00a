//! Word-measurement adapter used by the line wrapper.
//!
//! A measurer answers one question: how wide (in logical pixels) is this
//! sequence of words when joined with single spaces under the current font.
//! Measurers are rebuilt whenever a layout-affecting font setting changes.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_reader_config::FontConfig;
use unicode_width::UnicodeWidthStr;

/// Advance of one monospace cell as a fraction of the font size.
const MONOSPACE_ADVANCE_EM: f32 = 0.6;

/// Measures the rendered width of words joined with single spaces.
pub trait MeasureText: Send {
    /// Returns the width of `words.join(" ")`. An empty slice measures 0.
    fn measure(&self, words: &[&str]) -> f32;
}

impl<F> MeasureText for F
where
    F: Fn(&[&str]) -> f32 + Send,
{
    fn measure(&self, words: &[&str]) -> f32 {
        self(words)
    }
}

/// Fixed-advance measurer: every terminal column costs `advance` pixels.
///
/// Wide (East Asian) characters count as two columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance: f32,
}

impl MonospaceMeasure {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }

    pub fn for_font(font: &FontConfig) -> Self {
        Self::new(font.size * MONOSPACE_ADVANCE_EM)
    }
}

impl MeasureText for MonospaceMeasure {
    fn measure(&self, words: &[&str]) -> f32 {
        if words.is_empty() {
            return 0.0;
        }
        let columns: usize = words.iter().map(|w| w.width()).sum::<usize>() + words.len() - 1;
        columns as f32 * self.advance
    }
}

/// Measurer backed by the horizontal advances of a real font file.
///
/// Advances are read once from the font's unicode cmap; kerning and shaping
/// are not applied.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    /// Advance per character, in font units.
    advances: HashMap<char, u16>,
    /// Advance of `.notdef`, used for characters the font does not cover.
    fallback_advance: u16,
    /// Pixels per font unit.
    scale: f32,
}

impl FontMeasure {
    /// Parses `data` as a TrueType/OpenType face and reads its advance table.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not a parseable font face.
    pub fn from_bytes(data: &[u8], size: f32) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| anyhow::anyhow!("failed to parse font face: {e}"))?;

        let mut codepoints = Vec::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if subtable.is_unicode() {
                    subtable.codepoints(|cp| codepoints.push(cp));
                }
            }
        }

        let mut advances = HashMap::with_capacity(codepoints.len());
        for ch in codepoints.into_iter().filter_map(char::from_u32) {
            if let Some(advance) = face
                .glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                advances.insert(ch, advance);
            }
        }

        let fallback_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(face.units_per_em() / 2);
        let units_per_em = f32::from(face.units_per_em().max(1));

        Ok(Self {
            advances,
            fallback_advance,
            scale: size / units_per_em,
        })
    }

    /// Loads the font at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path, size: f32) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font file: {}", path.display()))?;
        Self::from_bytes(&data, size)
            .with_context(|| format!("failed to load font: {}", path.display()))
    }

    /// Number of characters with a known advance.
    pub fn coverage(&self) -> usize {
        self.advances.len()
    }

    fn advance_units(&self, ch: char) -> u32 {
        u32::from(
            self.advances
                .get(&ch)
                .copied()
                .unwrap_or(self.fallback_advance),
        )
    }
}

impl MeasureText for FontMeasure {
    fn measure(&self, words: &[&str]) -> f32 {
        if words.is_empty() {
            return 0.0;
        }
        let space = u64::from(self.advance_units(' ')) * (words.len() as u64 - 1);
        let glyphs: u64 = words
            .iter()
            .flat_map(|w| w.chars())
            .map(|ch| u64::from(self.advance_units(ch)))
            .sum();
        (space + glyphs) as f32 * self.scale
    }
}

/// Builds the measurer for `font`: the configured font file when it loads,
/// otherwise a monospace approximation.
pub fn measure_for(font: &FontConfig) -> Box<dyn MeasureText> {
    if let Some(path) = &font.font_path {
        match FontMeasure::from_path(path, font.size) {
            Ok(measure) => {
                tracing::debug!(
                    "Measuring with {} ({} glyph advances)",
                    path.display(),
                    measure.coverage()
                );
                return Box::new(measure);
            }
            Err(e) => {
                tracing::warn!("Falling back to monospace measurement: {e:#}");
            }
        }
    }
    Box::new(MonospaceMeasure::for_font(font))
}
