use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use feedmill_collection::{ChannelNotifier, CollectionClient, CollectionStatus, CollectionTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    feedmill_core::init()?;

    let (config, _validation) =
        feedmill_core::Config::load_validated().context("Failed to load configuration")?;

    let client = CollectionClient::with_timeout(
        &config.api.base_url,
        Duration::from_secs(config.api.request_timeout_secs),
    )
    .context("Failed to create collection client")?;

    let (notifier, notifications) = ChannelNotifier::new();
    let tracker = CollectionTracker::with_options(
        client,
        Arc::new(notifier),
        Duration::from_millis(config.collection.poll_interval_ms),
    );

    let mut state_rx = tracker.subscribe();
    tracker.start().await.context("Failed to start collection")?;
    tracing::info!("Collection started against {}", config.api.base_url);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracker.cancel();
                anyhow::bail!("Collection cancelled");
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();

                while let Ok(note) = notifications.try_recv() {
                    println!("[{}] {}", note.level, note.message);
                }

                if let Some(progress) = &state.job_progress {
                    println!("[{:>3}%] {} {}", progress.progress, progress.stage, progress.message);
                }

                if !state.is_collecting {
                    // The terminal notification lands just after the state
                    // publish; give it a moment before exiting.
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    while let Ok(note) = notifications.try_recv() {
                        println!("[{}] {}", note.level, note.message);
                    }
                    if let Some(last) = &state.last_result {
                        match last.status {
                            CollectionStatus::Completed => {
                                if let Some(result) = &last.result {
                                    println!(
                                        "Done: {} new, {} existing",
                                        result.total_new, result.total_existing
                                    );
                                }
                                return Ok(());
                            }
                            _ => anyhow::bail!("Collection failed"),
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
