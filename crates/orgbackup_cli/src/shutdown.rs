use orgbackup::CancellationToken;

/// Cancel `cancel` on the first Ctrl+C or SIGTERM; exit on the second.
///
/// The running unit is allowed to finish so that no partial archive or
/// staging directory is left behind. A forced exit skips that cleanup.
pub(crate) fn setup_shutdown_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::warn!("Shutdown requested, finishing current unit");
        cancel.cancel();

        // Wait for a second signal for force quit
        wait_for_signal().await;
        tracing::error!("Force quit");
        std::process::exit(130);
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.expect("Failed to install Ctrl+C handler"),
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
