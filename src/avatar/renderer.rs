//! Avatar renderer integration point
//!
//! The mapping from viseme coefficients to model parameters is owned by the
//! rendering library and varies per model, so the client defines a single
//! trait the host implements instead of probing any library's export
//! surface at runtime.

use parking_lot::Mutex;
use std::sync::Arc;

/// The one seam between lip-sync scheduling and the avatar model.
pub trait AvatarRenderer: Send {
    /// Apply blend-shape coefficients for the current mouth frame.
    fn apply_viseme(&mut self, coefficients: &[f32]);

    /// Return the mouth to its rest pose. Called when animation is
    /// cancelled.
    fn rest(&mut self) {}

    /// Whether a model is loaded and ready to animate
    fn is_ready(&self) -> bool {
        true
    }

    /// Human-readable renderer name for status display
    fn name(&self) -> &str {
        "renderer"
    }
}

/// Renderer shared between the session and the animation worker
pub type SharedRenderer = Arc<Mutex<dyn AvatarRenderer>>;

/// Wrap a renderer for sharing with the animation worker
pub fn shared_renderer(renderer: impl AvatarRenderer + 'static) -> SharedRenderer {
    Arc::new(Mutex::new(renderer))
}

/// Placeholder used when no avatar model is configured.
///
/// Reports not-ready so the UI can show the avatar channel as
/// unconfigured; frames are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl AvatarRenderer for NullRenderer {
    fn apply_viseme(&mut self, _coefficients: &[f32]) {}

    fn is_ready(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "none"
    }
}
