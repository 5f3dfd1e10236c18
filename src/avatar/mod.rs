//! Avatar lip-sync
//!
//! Visemes are timed blend-shape weight sets the backend attaches to each
//! audio chunk. The scheduler walks them against wall-clock time and feeds
//! the active set to whatever [`AvatarRenderer`] the host wired in.

pub mod renderer;
pub mod scheduler;
pub mod viseme;

pub use renderer::{shared_renderer, AvatarRenderer, NullRenderer, SharedRenderer};
pub use scheduler::VisemeScheduler;
pub use viseme::{active_viseme_at, Viseme};
