//! Dark palette for the whole window.

use eframe::egui::{self, Color32, Rounding, Stroke};

pub const BACKGROUND: Color32 = Color32::from_rgb(0x02, 0x06, 0x17);
pub const TEXT: Color32 = Color32::from_rgb(0xe5, 0xe7, 0xeb);
pub const MUTED: Color32 = Color32::from_rgb(0x9c, 0xa3, 0xaf);
pub const FIELD: Color32 = Color32::from_rgb(0x11, 0x18, 0x27);
pub const BORDER: Color32 = Color32::from_rgb(0x1f, 0x29, 0x37);
pub const ACCENT: Color32 = Color32::from_rgb(0x7c, 0x7c, 0xff);
pub const SELECTION: Color32 = Color32::from_rgb(0x31, 0x2e, 0x81);
pub const ERROR: Color32 = Color32::from_rgb(0xf8, 0x71, 0x71);

// Chat bubbles
pub const USER_LABEL: Color32 = Color32::from_rgb(0xed, 0x7b, 0xa3);
pub const USER_BUBBLE: Color32 = Color32::from_rgb(0x0f, 0x17, 0x2a);
pub const AI_LABEL: Color32 = Color32::from_rgb(0xe8, 0xe1, 0x15);
pub const AI_BUBBLE: Color32 = FIELD;

pub const FIELD_ROUNDING: f32 = 10.0;
pub const BUTTON_ROUNDING: f32 = 8.0;

pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.extreme_bg_color = FIELD;
    visuals.faint_bg_color = FIELD;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.window_rounding = Rounding::same(FIELD_ROUNDING);
    visuals.window_stroke = Stroke::new(1.0, BORDER);
    visuals.selection.bg_fill = SELECTION;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    // Flat sidebar-style buttons: muted until hovered.
    visuals.widgets.inactive.weak_bg_fill = Color32::TRANSPARENT;
    visuals.widgets.inactive.bg_fill = FIELD;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, MUTED);
    visuals.widgets.inactive.rounding = Rounding::same(BUTTON_ROUNDING);

    visuals.widgets.hovered.weak_bg_fill = FIELD;
    visuals.widgets.hovered.bg_fill = FIELD;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, BORDER);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.rounding = Rounding::same(BUTTON_ROUNDING);

    visuals.widgets.active.weak_bg_fill = FIELD;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.rounding = Rounding::same(BUTTON_ROUNDING);

    ctx.set_visuals(visuals);
}
