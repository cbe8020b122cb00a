//! Top-level application tying together the toolbar, reader canvas, and status bar.

mod status_bar;
mod toolbar;

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use eframe::egui;
use egui::Color32;

use rust_reader_config::font::FontUpdate;
use rust_reader_config::theme::UiColors;
use rust_reader_config::{FontConfig, ReaderConfig, ThemeDefinition};
use rust_reader_core::{
    Coordinator, CoordinatorHandle, CoordinatorOptions, DefaultSource, FileSource, InitRequest,
    MatchMode, Message, ReaderEvent, TextSource, UpdateRequest,
};

use crate::canvas::{to_color32, ReaderCanvas};

pub use status_bar::{LoadPhase, ReaderStatus};

/// Arguments passed from the command line to the application.
#[derive(Debug, Clone, Default)]
pub struct StartupArgs {
    /// URL or file path to open on startup.
    pub source: Option<String>,
    /// Initial search filter.
    pub search: Option<String>,
    /// Overrides the configured font size.
    pub font_size: Option<f32>,
    /// Config file to use instead of the per-user default.
    pub config_path: Option<PathBuf>,
}

/// Which color theme to use.
///
/// Wraps a string name. Special values: `"System"`, `"Dark"`, `"Light"`.
/// Any other value refers to a named theme from the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMode(pub String);

impl Default for ThemeMode {
    fn default() -> Self {
        Self::system()
    }
}

impl ThemeMode {
    pub fn system() -> Self {
        Self("System".to_string())
    }

    pub fn dark() -> Self {
        Self("Dark".to_string())
    }

    pub fn light() -> Self {
        Self("Light".to_string())
    }

    /// Returns true if this is the "System" mode.
    pub fn is_system(&self) -> bool {
        self.0 == "System"
    }

    /// Resolves "System" to a concrete theme name using the OS preference.
    /// Non-system modes return their own name.
    pub fn resolve(&self) -> &str {
        if self.is_system() {
            match dark_light::detect() {
                Ok(dark_light::Mode::Light) => "Light",
                _ => "Dark",
            }
        } else {
            &self.0
        }
    }
}

/// Looks up the theme for `mode`, falling back to the system theme and then
/// to the built-in dark theme. May reset `mode` to System.
fn resolve_theme(config: &ReaderConfig, mode: &mut ThemeMode) -> ThemeDefinition {
    let resolved_name = mode.resolve().to_string();
    match config.find_theme(&resolved_name).cloned() {
        Some(def) => def,
        None => {
            tracing::warn!("Theme '{}' not found, falling back to System", resolved_name);
            *mode = ThemeMode::system();
            let fallback_name = mode.resolve().to_string();
            config
                .find_theme(&fallback_name)
                .cloned()
                .unwrap_or_else(rust_reader_config::theme::builtin_dark)
        }
    }
}

/// The main application state.
pub struct App {
    pub config: ReaderConfig,
    config_path: PathBuf,
    pub theme_mode: ThemeMode,
    pub theme: ThemeDefinition,
    pub source_input: String,
    pub search_input: String,
    pub status: ReaderStatus,
    canvas: ReaderCanvas,
    coordinator: Option<CoordinatorHandle>,
    events: Receiver<ReaderEvent>,
    /// Source waiting for the canvas to be laid out before `Init` is sent.
    pending_source: Option<String>,
    accent_color: Color32,
}

impl App {
    /// Creates the application, reading local files and `http(s)` URLs.
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Self {
        let source: Arc<dyn TextSource> = match DefaultSource::new() {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::warn!("HTTP client unavailable, only local files can be opened: {e:#}");
                Arc::new(FileSource)
            }
        };
        Self::with_source(cc, args, source)
    }

    /// Creates the application with a custom text source.
    pub fn with_source(
        cc: &eframe::CreationContext<'_>,
        args: StartupArgs,
        source: Arc<dyn TextSource>,
    ) -> Self {
        let config_path = args
            .config_path
            .clone()
            .unwrap_or_else(ReaderConfig::config_path);
        let mut config = ReaderConfig::load_or_create(&config_path);
        if let Some(size) = args.font_size {
            config.font.size = size;
            config.font.sanitize();
        }

        let mut theme_mode = ThemeMode(config.current_theme.clone());
        let theme = resolve_theme(&config, &mut theme_mode);
        Self::apply_theme_visuals(&cc.egui_ctx, &theme.ui, theme.dark_mode);
        let accent_color = to_color32(theme.ui.accent_color);

        let (events_tx, events) = crossbeam_channel::unbounded();
        let options = CoordinatorOptions::from_config(&config, theme.reader.clone());
        let coordinator = match Coordinator::spawn(source, options, events_tx) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("Failed to start reader: {e:#}");
                None
            }
        };

        let mut app = Self {
            source_input: String::new(),
            search_input: args.search.clone().unwrap_or_default(),
            config,
            config_path,
            theme_mode,
            theme,
            status: ReaderStatus::default(),
            canvas: ReaderCanvas::new(),
            coordinator,
            events,
            pending_source: None,
            accent_color,
        };

        let initial = args
            .source
            .clone()
            .or_else(|| Some(app.config.last_source.clone()).filter(|s| !s.is_empty()));
        if let Some(location) = initial {
            app.source_input.clone_from(&location);
            app.open_source(&location);
        }
        app
    }

    /// Font sent to the reader: the configured font with the theme's text color.
    pub fn effective_font(&self) -> FontConfig {
        FontConfig {
            fill_style: self.theme.text_color,
            ..self.config.font.clone()
        }
    }

    /// Requests `location` to be opened. The load starts on the next frame.
    pub fn open_source(&mut self, location: &str) {
        let location = location.trim();
        if location.is_empty() {
            return;
        }
        self.pending_source = Some(location.to_string());
        self.config.last_source = location.to_string();
    }

    /// Returns true while a source is queued but not yet sent to the reader.
    pub fn has_pending_source(&self) -> bool {
        self.pending_source.is_some()
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.config.font.size = size;
        self.config.font.sanitize();
        self.send(Message::Update(UpdateRequest {
            font: FontUpdate {
                size: Some(self.config.font.size),
                ..Default::default()
            },
            ..Default::default()
        }));
    }

    pub fn set_search_regex(&mut self, use_regex: bool) {
        self.config.search_regex = use_regex;
        self.send(Message::Update(UpdateRequest {
            match_mode: Some(MatchMode::from_regex_flag(use_regex)),
            ..Default::default()
        }));
        // Re-run the active query under the new mode
        if !self.search_input.is_empty() {
            self.send_search();
        }
    }

    /// Switches to a new theme mode and pushes its colors to the reader.
    pub fn set_theme_mode(&mut self, mode: ThemeMode, ctx: &egui::Context) {
        self.theme_mode = mode;
        self.theme = resolve_theme(&self.config, &mut self.theme_mode);
        self.config.current_theme = self.theme_mode.0.clone();
        Self::apply_theme_visuals(ctx, &self.theme.ui, self.theme.dark_mode);
        self.accent_color = to_color32(self.theme.ui.accent_color);
        self.send(Message::Update(UpdateRequest {
            font: FontUpdate {
                fill_style: Some(self.theme.text_color),
                ..Default::default()
            },
            colors: Some(self.theme.reader.clone()),
            ..Default::default()
        }));
    }

    fn send_search(&mut self) {
        // Before the first Init the query is sent along with it
        if !self.canvas.is_attached() {
            return;
        }
        self.send(Message::Search {
            text: self.search_input.clone(),
        });
    }

    fn send(&self, message: Message) {
        let Some(coordinator) = &self.coordinator else {
            return;
        };
        if let Err(e) = coordinator.send(message) {
            tracing::warn!("Reader unavailable: {e:#}");
        }
    }

    /// Forwards canvas input. Scroll and drag motion is dropped rather than blocking
    /// the UI when the reader is busy; everything else waits for room in the inbox.
    fn send_input(&self, message: Message) {
        let Some(coordinator) = &self.coordinator else {
            return;
        };
        match coordinator.forward(message) {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Reader inbox full, input dropped"),
            Err(e) => tracing::warn!("Reader unavailable: {e:#}"),
        }
    }

    /// Sends `Init` for the queued source once the canvas size is known.
    fn start_pending(&mut self, ctx: &egui::Context) {
        let Some(viewport) = self.canvas.viewport() else {
            return;
        };
        let Some(location) = self.pending_source.take() else {
            return;
        };
        let request = InitRequest {
            source_url: location,
            surface: self.canvas.make_surface(ctx),
            viewport,
            font: self.effective_font(),
        };
        self.send(Message::Init(request));
        if !self.search_input.is_empty() {
            self.send_search();
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            tracing::debug!("Reader event: {event:?}");
            self.status.apply(&event);
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!("Failed to save config: {e}");
        }
    }

    fn apply_theme_visuals(ctx: &egui::Context, ui_colors: &UiColors, dark_mode: bool) {
        let mut visuals = if dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        visuals.panel_fill = to_color32(ui_colors.panel_fill);
        visuals.window_fill = to_color32(ui_colors.window_fill);
        visuals.faint_bg_color = to_color32(ui_colors.faint_bg_color);
        visuals.extreme_bg_color = to_color32(ui_colors.extreme_bg_color);
        visuals.selection.bg_fill = to_color32(ui_colors.accent_color);

        let widget_rounding = egui::CornerRadius::same(4);
        visuals.widgets.inactive.corner_radius = widget_rounding;
        visuals.widgets.hovered.corner_radius = widget_rounding;
        visuals.widgets.active.corner_radius = widget_rounding;
        visuals.widgets.noninteractive.bg_stroke.width = 0.0;

        ctx.set_visuals(visuals);

        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::Vec2::new(8.0, 6.0);
            style.spacing.button_padding = egui::Vec2::new(8.0, 4.0);
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        let panel_fill = ctx.style().visuals.panel_fill;
        let extreme_bg = ctx.style().visuals.extreme_bg_color;

        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::new()
                    .fill(panel_fill)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                self.show_toolbar(ui, ctx);
            });

        egui::TopBottomPanel::bottom("status_bar")
            .max_height(24.0)
            .frame(
                egui::Frame::new()
                    .fill(extreme_bg)
                    .inner_margin(egui::Margin::symmetric(8, 3)),
            )
            .show(ctx, |ui| {
                self.show_status_bar(ui);
            });

        let background = self.theme.reader.background;
        let row_height = self.config.font.row_height();
        let messages = egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(to_color32(background)))
            .show(ctx, |ui| self.canvas.show(ui, row_height, background))
            .inner;
        for message in messages {
            self.send_input(message);
        }

        self.start_pending(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_config();
        if let Some(coordinator) = self.coordinator.take() {
            if let Err(e) = coordinator.dispose() {
                tracing::warn!("{e:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_mode_default_is_system() {
        let mode = ThemeMode::default();
        assert!(mode.is_system());
        assert_eq!(mode, ThemeMode::system());
    }

    #[test]
    fn test_theme_mode_resolve_named() {
        assert_eq!(ThemeMode::light().resolve(), "Light");
        assert_eq!(ThemeMode::dark().resolve(), "Dark");
        assert_eq!(ThemeMode("Sepia".into()).resolve(), "Sepia");
    }

    #[test]
    fn test_theme_mode_system_resolves_to_builtin() {
        let resolved = ThemeMode::system().resolve().to_string();
        assert!(resolved == "Dark" || resolved == "Light");
    }

    #[test]
    fn test_resolve_theme_finds_named_theme() {
        let config = ReaderConfig::default();
        let mut mode = ThemeMode("Sepia".into());
        let theme = resolve_theme(&config, &mut mode);
        assert_eq!(theme.name, "Sepia");
        assert_eq!(mode.0, "Sepia");
    }

    #[test]
    fn test_resolve_theme_unknown_falls_back_to_system() {
        let config = ReaderConfig::default();
        let mut mode = ThemeMode("Neon".into());
        let theme = resolve_theme(&config, &mut mode);
        assert!(mode.is_system());
        assert!(theme.name == "Dark" || theme.name == "Light");
    }

    #[test]
    fn test_resolve_theme_without_builtins_uses_builtin_dark() {
        let config = ReaderConfig {
            themes: Vec::new(),
            ..Default::default()
        };
        let mut mode = ThemeMode::dark();
        let theme = resolve_theme(&config, &mut mode);
        assert_eq!(theme, rust_reader_config::theme::builtin_dark());
    }
}
