//! Reusable UI components

pub mod caption;
pub mod controls;
pub mod status_panel;

pub use caption::Caption;
pub use controls::Controls;
pub use status_panel::StatusPanel;
