//! Status panel component
//!
//! Color-coded indicator per channel: audio output, avatar, connection and
//! playback.

use crate::ui::state::{IndicatorState, StatusChannel, UiState};
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText, Vec2};

pub struct StatusPanel<'a> {
    state: &'a UiState,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    pub fn new(state: &'a UiState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn indicator_color(&self, state: IndicatorState) -> Color32 {
        match state {
            IndicatorState::Inactive => self.theme.status_inactive,
            IndicatorState::Pending => self.theme.status_pending,
            IndicatorState::Active => self.theme.status_active,
            IndicatorState::Failed => self.theme.status_failed,
        }
    }

    fn show_channel(&self, ui: &mut egui::Ui, channel: &StatusChannel) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter().circle_filled(
                rect.center(),
                4.0,
                self.indicator_color(channel.state),
            );

            ui.label(
                RichText::new(channel.label)
                    .size(12.0)
                    .color(self.theme.text_primary),
            );
            ui.label(
                RichText::new(&channel.text)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            self.show_channel(ui, &self.state.audio);
            ui.separator();
            self.show_channel(ui, &self.state.avatar);
            ui.separator();
            self.show_channel(ui, &self.state.connection);
            ui.separator();
            self.show_channel(ui, &self.state.playback);
        });
    }
}
