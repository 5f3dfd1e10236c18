//! Viewer window
//!
//! egui front end: a header with status indicators, a central caption area
//! and bottom stream controls. All session interaction happens through
//! `SessionHandle` events polled once per frame.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::StreamviewApp;
pub use state::{IndicatorState, UiState};
pub use theme::Theme;
