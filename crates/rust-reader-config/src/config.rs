/// Reader configuration: load, save, merge, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::font::FontConfig;
use crate::theme::{builtin_dark, builtin_light, builtin_sepia, ThemeDefinition};

/// Top-level reader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub current_theme: String,
    pub font: FontConfig,
    /// Width reserved on the trailing edge for line numbers.
    pub gutter_width: f32,
    pub thumb_width: f32,
    pub thumb_height: f32,
    /// Content pixels scrolled per pixel of thumb drag (1.0 = direct mapping).
    pub drag_scale: f32,
    /// Treat search queries as case-insensitive regular expressions.
    pub search_regex: bool,
    /// Last URL or path opened. Empty = none.
    pub last_source: String,
    pub themes: Vec<ThemeDefinition>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            current_theme: "System".to_string(),
            font: FontConfig::default(),
            gutter_width: 56.0,
            thumb_width: 12.0,
            thumb_height: 60.0,
            drag_scale: 1.0,
            search_regex: false,
            last_source: String::new(),
            themes: vec![builtin_dark(), builtin_light(), builtin_sepia()],
        }
    }
}

impl ReaderConfig {
    /// Returns the config file path: `<config dir>/rust-reader/rust-reader.json`.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rust-reader").join("rust-reader.json"))
            .unwrap_or_else(|| PathBuf::from("rust-reader.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<ReaderConfig>(&contents) {
                    Ok(mut config) => {
                        config.with_builtins_merged();
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Don't overwrite a broken file
            let mut config = Self::default();
            config.sanitize();
            config
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Ensures the built-in themes are always present.
    /// User-defined themes with matching names take priority over built-ins.
    pub fn with_builtins_merged(&mut self) {
        for (slot, builtin) in [builtin_dark(), builtin_light(), builtin_sepia()]
            .into_iter()
            .enumerate()
        {
            if !self.themes.iter().any(|t| t.name == builtin.name) {
                let insert_at = slot.min(self.themes.len());
                self.themes.insert(insert_at, builtin);
            }
        }
    }

    /// Finds a theme by name.
    pub fn find_theme(&self, name: &str) -> Option<&ThemeDefinition> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Returns all theme names.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.font.sanitize();
        self.gutter_width = finite_or(self.gutter_width, 56.0).clamp(0.0, 400.0);
        self.thumb_width = finite_or(self.thumb_width, 12.0).clamp(2.0, 64.0);
        self.thumb_height = finite_or(self.thumb_height, 60.0).clamp(8.0, 400.0);
        self.drag_scale = finite_or(self.drag_scale, 1.0);
        if self.drag_scale <= 0.0 {
            self.drag_scale = 1.0;
        }
        self.drag_scale = self.drag_scale.min(10.0);

        let is_builtin_mode = self.current_theme == "System";
        if !is_builtin_mode && self.find_theme(&self.current_theme).is_none() {
            self.current_theme = "System".to_string();
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
