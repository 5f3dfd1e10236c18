//! Stream controls component
//!
//! Topic input plus start/stop buttons.

use crate::ui::state::UiState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText};

pub struct Controls<'a> {
    state: &'a mut UiState,
    theme: &'a Theme,
}

impl<'a> Controls<'a> {
    pub fn new(state: &'a mut UiState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Topic")
                    .size(13.0)
                    .color(self.theme.text_muted),
            );

            let editor = ui.add_enabled(
                self.state.can_start(),
                egui::TextEdit::singleline(&mut self.state.topic)
                    .hint_text("What should the stream talk about?")
                    .desired_width(280.0),
            );

            let submitted =
                editor.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let start = ui
                .add_enabled(self.state.can_start(), egui::Button::new("Start Stream"))
                .clicked();

            if start || (submitted && self.state.can_start()) {
                self.state.request_start();
            }

            let stop_enabled = self.state.streaming || self.state.starting;
            if ui
                .add_enabled(stop_enabled, egui::Button::new("Stop"))
                .clicked()
            {
                self.state.request_stop();
            }

            if self.state.starting {
                ui.spinner();
            }
        });
    }
}
