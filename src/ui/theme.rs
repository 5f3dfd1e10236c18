//! Visual theme
//!
//! Dark palette shared by all components.

use egui::Color32;

/// Color palette and spacing for the viewer window
#[derive(Clone, Debug)]
pub struct Theme {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub status_inactive: Color32,
    pub status_pending: Color32,
    pub status_active: Color32,
    pub status_failed: Color32,
    pub spacing: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg_primary: Color32::from_rgb(18, 18, 22),
            bg_secondary: Color32::from_rgb(28, 28, 34),
            text_primary: Color32::from_rgb(235, 235, 240),
            text_muted: Color32::from_rgb(140, 140, 150),
            accent: Color32::from_rgb(100, 150, 250),
            status_inactive: Color32::from_rgb(110, 110, 120),
            status_pending: Color32::from_rgb(240, 170, 60),
            status_active: Color32::from_rgb(90, 200, 120),
            status_failed: Color32::from_rgb(230, 90, 90),
            spacing: 12.0,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_visuals(egui::Visuals::dark());
    }
}
