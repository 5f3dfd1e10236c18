use anyhow::Result;
use std::sync::Arc;
use streamview::avatar::{shared_renderer, NullRenderer};
use streamview::net::HttpStreamApi;
use streamview::session::{SessionConfig, StreamSession};
use streamview::ui::StreamviewApp;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamview=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Streamview");

    let config = SessionConfig::from_env();
    config.validate()?;
    info!("Backend: {}", config.api_base);
    let banner_duration = config.error_banner;

    let api = Arc::new(HttpStreamApi::new(&config)?);

    // The avatar renderer is a host integration point; without a model
    // wired in the stream runs audio-only.
    let renderer = shared_renderer(NullRenderer);

    #[cfg(feature = "audio-io")]
    let (session, handle) = StreamSession::new(
        config,
        api,
        Box::new(streamview::audio::CpalSink::new),
        renderer,
    )?;

    #[cfg(not(feature = "audio-io"))]
    let (session, handle) = StreamSession::new(
        config,
        api,
        Box::new(|| Ok(streamview::audio::NullSink::new())),
        renderer,
    )?;

    session.start()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 480.0])
            .with_title("Streamview"),
        ..Default::default()
    };

    let ui_handle = handle.clone();
    eframe::run_native(
        "Streamview",
        options,
        Box::new(move |cc| Ok(Box::new(StreamviewApp::new(cc, ui_handle, banner_duration)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    let _ = handle.shutdown();
    info!("Streamview stopped");
    Ok(())
}
