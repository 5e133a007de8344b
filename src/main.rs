//! Shuttersync - Automatic PNG to JPEG Conversion
//!
//! Headless entry point standing in for a presentation layer: it loads the
//! persisted settings, runs a single watch session, and prints the event
//! streams until Ctrl-C or a fatal error.

use {anyhow::Result, tracing::info, tracing_subscriber::EnvFilter};

use shuttersync::{
    config::{SettingsManager, WatchConfig},
    error::{ResultExt, SessionErrorReporter},
    watch::WatchSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let manager = SettingsManager::new().add_context("failed to load settings")?;
    let settings = manager.get_settings().clone();
    let config = WatchConfig::from_settings(&settings).add_context("invalid watch configuration")?;

    let mut session = WatchSession::new(config);
    let events = session.events();
    let fatal_errors = session.fatal_errors();
    session.start().await?;
    info!("watching {} -> {}", settings.source_directory, settings.target_directory);

    // Per-file outcomes go to the log stream on stdout
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("{}", event);
        }
    });

    // Fatal errors terminate the session and are surfaced separately
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
        received = fatal_errors.recv() => {
            if let Ok(error) = received {
                eprintln!("fatal: {}", SessionErrorReporter::fatal(&error));
            }
        }
    }

    session.stop().await;
    printer.abort();
    Ok(())
}
