//! Main application struct and eframe integration

use crate::session::SessionHandle;
use crate::ui::components::{Caption, Controls, StatusPanel};
use crate::ui::state::UiState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;

/// The viewer application window
pub struct StreamviewApp {
    state: UiState,
    theme: Theme,
}

impl StreamviewApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: SessionHandle,
        banner_duration: Duration,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            state: UiState::new(session, banner_duration),
            theme,
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Streamview")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("AI Streamer Viewer")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );
                });
                ui.add_space(4.0);
                StatusPanel::new(&self.state, &self.theme).show(ui);
            });
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                Controls::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_banner(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.banner_message().map(str::to_string) else {
            return;
        };

        TopBottomPanel::top("error_banner")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.status_failed)
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&message).size(13.0).color(egui::Color32::WHITE));
                });
            });
    }

    fn show_central(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                Caption::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for StreamviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_events();

        self.show_header(ctx);
        self.show_banner(ctx);
        self.show_controls(ctx);
        self.show_central(ctx);

        // Events arrive from worker threads; poll again soon
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for StreamviewApp {
    fn drop(&mut self) {
        self.state.request_shutdown();
    }
}
