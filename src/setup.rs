use eframe::egui;
use tracing::{error, info};

use crate::config::{save_api_key, validate_api_key, ConfigError};
use crate::theme;

pub enum SetupOutcome {
    Pending,
    Accepted(String),
    Rejected,
}

/// First-run key entry, shown until a valid key has been saved.
#[derive(Default)]
pub struct SetupDialog {
    pub input: String,
    pub error_message: Option<String>,
}

impl SetupDialog {
    /// Validates the input and hands it to `save`. Returns the saved key.
    pub fn submit<F>(&mut self, save: F) -> Option<String>
    where
        F: FnOnce(&str) -> Result<(), ConfigError>,
    {
        let key = match validate_api_key(&self.input) {
            Ok(key) => key,
            Err(e) => {
                self.error_message = Some(e.to_string());
                return None;
            }
        };

        if let Err(e) = save(&key) {
            error!(error = %e, "Failed to save API key");
            self.error_message = Some(e.to_string());
            return None;
        }

        info!("API key saved");
        self.error_message = None;
        self.input.clear();
        Some(key)
    }

    pub fn show(&mut self, ctx: &egui::Context) -> SetupOutcome {
        let mut outcome = SetupOutcome::Pending;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.25);
                ui.set_max_width(380.0);

                ui.heading(egui::RichText::new("Kyanos").size(24.0).strong());
                ui.add_space(6.0);
                ui.label(egui::RichText::new("Enter your OpenAI API key").color(theme::MUTED));
                ui.add_space(14.0);

                let response = ui.add_sized(
                    [ui.available_width(), 32.0],
                    egui::TextEdit::singleline(&mut self.input)
                        .hint_text("sk-...")
                        .password(true)
                        .margin(egui::vec2(10.0, 8.0)),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(14.0);
                ui.horizontal(|ui| {
                    if ui.button("Continue").clicked() || submitted {
                        if let Some(key) = self.submit(save_api_key) {
                            outcome = SetupOutcome::Accepted(key);
                        }
                    }
                    if ui.button("Quit").clicked() {
                        outcome = SetupOutcome::Rejected;
                    }
                });

                if let Some(error) = &self.error_message {
                    ui.add_space(8.0);
                    ui.colored_label(theme::ERROR, format!("⚠ {}", error));
                }
            });
        });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{save_api_key_to_path, Config};
    use tempfile::TempDir;

    #[test]
    fn invalid_key_is_rejected_and_not_saved() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        let mut dialog = SetupDialog {
            input: "not-a-key".to_string(),
            ..Default::default()
        };

        assert_eq!(dialog.submit(|key| save_api_key_to_path(&path, key)), None);
        assert_eq!(dialog.error_message.as_deref(), Some("Invalid API key"));
        assert_eq!(dialog.input, "not-a-key");
        assert!(!path.exists());
    }

    #[test]
    fn valid_key_is_trimmed_and_saved() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(".Kyanos").join("config.json");
        let mut dialog = SetupDialog {
            input: "  sk-live-key  ".to_string(),
            error_message: Some("Invalid API key".to_string()),
        };

        let saved = dialog.submit(|key| save_api_key_to_path(&path, key));
        assert_eq!(saved.as_deref(), Some("sk-live-key"));
        assert_eq!(dialog.error_message, None);
        assert!(dialog.input.is_empty());

        let config = Config::load_from_path(&path).expect("Failed to load config");
        assert_eq!(config.api_key(), Some("sk-live-key"));
    }

    #[test]
    fn save_failure_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A directory where the file should be makes the write fail.
        let path = temp_dir.path().join("config.json");
        std::fs::create_dir(&path).expect("create dir");

        let mut dialog = SetupDialog {
            input: "sk-abc".to_string(),
            ..Default::default()
        };

        assert_eq!(dialog.submit(|key| save_api_key_to_path(&path, key)), None);
        assert!(dialog.error_message.is_some());
    }
}
