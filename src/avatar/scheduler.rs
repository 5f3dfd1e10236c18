//! Viseme animation scheduler
//!
//! Runs one frame-tick worker per audio segment: every frame interval it
//! computes elapsed wall-clock time, looks up the active viseme and applies
//! it through the renderer. The loop ends on its own once the segment
//! duration has elapsed; starting a new run always cancels the previous one
//! first, so at most one animation loop exists at any time.

use crate::avatar::renderer::SharedRenderer;
use crate::avatar::viseme::{active_viseme_at, Viseme};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

struct SchedulerRun {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct VisemeScheduler {
    renderer: SharedRenderer,
    frame_interval: Duration,
    run: Option<SchedulerRun>,
}

impl VisemeScheduler {
    pub fn new(renderer: SharedRenderer, frame_interval: Duration) -> Self {
        Self {
            renderer,
            frame_interval,
            run: None,
        }
    }

    /// Begin animating `visemes` over `duration_ms`, cancelling any
    /// previous run first.
    pub fn start(&mut self, visemes: Vec<Viseme>, duration_ms: f64) {
        self.stop();

        if visemes.is_empty() || duration_ms <= 0.0 {
            return;
        }

        debug!(
            "Starting viseme animation: {} visemes over {:.0}ms",
            visemes.len(),
            duration_ms
        );

        let cancel = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::clone(&cancel);
        let renderer = Arc::clone(&self.renderer);
        let frame_interval = self.frame_interval;

        let handle = thread::spawn(move || {
            let started = Instant::now();
            loop {
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }

                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                if let Some(viseme) = active_viseme_at(&visemes, elapsed_ms) {
                    renderer.lock().apply_viseme(&viseme.coefficients);
                }

                // The frame at or past the end still applied the final viseme
                if elapsed_ms >= duration_ms {
                    return;
                }

                thread::sleep(frame_interval);
            }
        });

        self.run = Some(SchedulerRun { cancel, handle });
    }

    /// Cancel the running animation and return the mouth to rest.
    /// Idempotent.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.store(true, Ordering::SeqCst);
            let _ = run.handle.join();
            self.renderer.lock().rest();
        }
    }

    /// Whether an animation worker is still running
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .map(|run| !run.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for VisemeScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
