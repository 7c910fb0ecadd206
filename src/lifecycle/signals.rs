//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT/SIGTERM to end a watch session
//! - Surface SIGHUP as a manual reload request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use tokio::sync::mpsc;

/// Resolves once SIGINT (Ctrl-C) or, on Unix, SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Spawn a task that forwards every SIGHUP as a unit message.
///
/// On non-Unix targets the returned receiver never yields.
pub fn reload_requests() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    #[cfg(unix)]
    tokio::spawn(async move {
        let mut hangup =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::error!("Failed to listen for SIGHUP: {}", e);
                    return;
                }
            };
        while hangup.recv().await.is_some() {
            tracing::info!("Received SIGHUP, requesting reload");
            if tx.send(()).is_err() {
                break;
            }
        }
    });

    #[cfg(not(unix))]
    drop(tx);

    rx
}
