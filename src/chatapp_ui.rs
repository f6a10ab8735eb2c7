use eframe::egui;
use std::time::Duration;

use crate::chatapp::{ChatApp, ChatMessage, ChatView, ContentView, Sender};
use crate::mode::Mode;
use crate::setup::SetupOutcome;
use crate::theme;

const SIDEBAR_WIDTH: f32 = 220.0;
const INPUT_AREA_HEIGHT: f32 = 56.0;
const GENERATE_BUTTON_WIDTH: f32 = 110.0;

/// Space left after reserving `reserved`, never negative.
fn leftover(available: f32, reserved: f32) -> f32 {
    (available - reserved).max(0.0)
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep polling while any view is waiting on the network
        if self.any_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.process_replies();

        if let Some(setup) = &mut self.setup {
            match setup.show(ctx) {
                SetupOutcome::Accepted(key) => self.finish_setup(key),
                SetupOutcome::Rejected => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                SetupOutcome::Pending => {}
            }
            return;
        }

        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| self.render_sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.active {
            Mode::Chat => {
                if self.chat.show(ui) {
                    self.send_message(ctx);
                }
            }
            mode => {
                let requested = self
                    .content_view_mut(mode)
                    .map_or(false, |view| view.show(ui));
                if requested {
                    self.generate(mode, ctx);
                }
            }
        });
    }
}

impl ChatApp {
    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.heading(egui::RichText::new("Kyanos").size(20.0).strong());
        ui.add_space(12.0);

        for mode in Mode::ALL {
            ui.horizontal(|ui| {
                let selected = self.active == mode;
                let label = egui::RichText::new(mode.label()).size(15.0);
                if ui.selectable_label(selected, label).clicked() {
                    self.switch_to(mode);
                }
                if self.is_pending(mode) {
                    ui.spinner();
                }
            });
            ui.add_space(2.0);
        }

        if let Some(client) = &self.client {
            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(client.model())
                        .small()
                        .color(theme::MUTED),
                );
            });
        }
    }
}

impl ChatView {
    /// Draws the transcript and input. Returns true when the user sent.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let available_height = ui.available_height();
        let mut send = false;

        ui.vertical(|ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .max_height(leftover(available_height, INPUT_AREA_HEIGHT))
                .show(ui, |ui| {
                    for message in &self.messages {
                        render_message(ui, message);
                    }
                    if self.is_pending() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(
                                egui::RichText::new("Kyanos is thinking…").color(theme::MUTED),
                            );
                        });
                    }
                });

            ui.add_space(8.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("Message Kyanos…")
                    .desired_width(f32::INFINITY)
                    .margin(egui::vec2(10.0, 10.0)),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send = true;
                response.request_focus();
            }
        });

        send
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let (label, label_color, fill, padding) = match message.sender {
        Sender::User => ("You", theme::USER_LABEL, theme::USER_BUBBLE, 10.0),
        Sender::Kyanos | Sender::Error => ("Kyanos", theme::AI_LABEL, theme::AI_BUBBLE, 12.0),
    };

    ui.label(egui::RichText::new(label).size(11.0).color(label_color));
    ui.add_space(4.0);

    let max_width = ui.available_width() * 0.8;
    egui::Frame::none()
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, theme::BORDER))
        .rounding(egui::Rounding::same(theme::FIELD_ROUNDING))
        .inner_margin(egui::style::Margin::same(padding))
        .show(ui, |ui| {
            ui.set_max_width(max_width);
            let text = egui::RichText::new(&message.text).size(14.0);
            if message.sender == Sender::Error {
                ui.label(text.color(theme::ERROR));
            } else {
                ui.label(text);
            }
        });

    ui.add_space(14.0);
}

impl ContentView {
    /// Draws the panel. Returns true when the user asked to generate.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let mut generate = false;
        let pending = self.is_pending();

        ui.heading(egui::RichText::new(self.mode.label()).size(20.0).strong());
        ui.add_space(14.0);

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.topic)
                    .hint_text("Enter topic")
                    .desired_width(leftover(ui.available_width(), GENERATE_BUTTON_WIDTH))
                    .margin(egui::vec2(10.0, 10.0)),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                generate = true;
            }
            if ui
                .add_enabled(!pending, egui::Button::new("Generate"))
                .clicked()
            {
                generate = true;
            }
            if pending {
                ui.spinner();
            }
        });

        ui.add_space(14.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                // Read-only but still selectable for copying.
                let mut output = self.output.as_str();
                ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(&mut output)
                        .font(egui::TextStyle::Body)
                        .margin(egui::vec2(10.0, 10.0)),
                );
            });

        generate
    }
}
