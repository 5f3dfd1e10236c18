//! Caption display component
//!
//! Shows the text of the chunk currently playing, or the backend's note
//! when nothing is.

use crate::ui::state::UiState;
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub struct Caption<'a> {
    state: &'a UiState,
    theme: &'a Theme,
}

impl<'a> Caption<'a> {
    pub fn new(state: &'a UiState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing * 2.0);

            match (&self.state.caption, &self.state.backend_note) {
                (Some(caption), _) => {
                    ui.label(
                        RichText::new(caption)
                            .size(18.0)
                            .color(self.theme.text_primary),
                    );
                }
                (None, Some(note)) => {
                    ui.label(RichText::new(note).size(14.0).color(self.theme.text_muted));
                }
                (None, None) => {
                    ui.label(
                        RichText::new("Enter a topic and start the stream")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );
                }
            }
        });
    }
}
