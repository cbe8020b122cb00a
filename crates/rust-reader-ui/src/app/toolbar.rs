//! Toolbar: source entry, search box, and reading preferences.

use eframe::egui;
use egui::Key;

use super::{App, ThemeMode};

impl App {
    /// Renders the toolbar at the top of the window.
    pub(crate) fn show_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label("Source:");
            let source = ui.add(
                egui::TextEdit::singleline(&mut self.source_input)
                    .hint_text("URL or file path")
                    .desired_width(320.0),
            );
            let entered = source.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if entered || ui.button("Open").clicked() {
                let location = self.source_input.trim().to_string();
                self.open_source(&location);
            }
            if ui.button("Browse…").clicked() {
                self.browse_file();
            }

            ui.separator();

            ui.label("Search:");
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Filter lines")
                    .desired_width(200.0),
            );
            if search.changed() {
                self.send_search();
            }
            let mut use_regex = self.config.search_regex;
            if ui.checkbox(&mut use_regex, "Regex").changed() {
                self.set_search_regex(use_regex);
            }

            ui.separator();

            ui.label("Size:");
            let mut size = self.config.font.size;
            if ui
                .add(egui::DragValue::new(&mut size).range(6.0..=96.0))
                .changed()
            {
                self.set_font_size(size);
            }

            ui.separator();

            let theme_names: Vec<String> = std::iter::once("System".to_string())
                .chain(self.config.themes.iter().map(|t| t.name.clone()))
                .collect();
            let current_label = self.theme_mode.0.clone();
            egui::ComboBox::from_label("Theme")
                .selected_text(&current_label)
                .show_ui(ui, |ui| {
                    for name in &theme_names {
                        if ui
                            .selectable_value(&mut self.theme_mode.0, name.clone(), name)
                            .changed()
                        {
                            self.set_theme_mode(ThemeMode(self.theme_mode.0.clone()), ctx);
                        }
                    }
                });
        });
    }

    /// Opens a file dialog and loads the selected file.
    fn browse_file(&mut self) {
        let dialog = rfd::FileDialog::new()
            .set_title("Open Text")
            .add_filter("Text", &["txt", "text", "md"])
            .add_filter("All files", &["*"]);
        if let Some(path) = dialog.pick_file() {
            let location = path.to_string_lossy().into_owned();
            self.source_input.clone_from(&location);
            self.open_source(&location);
        }
    }
}
