// Interrupt handling: SIGINT/SIGTERM cancel a token that the command loop
// checks between commands. In-flight requests are never interrupted.

use std::io;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Install signal handlers on a dedicated thread and return the token they
/// cancel.
///
/// The command loop is blocking, so the signal listener gets its own
/// single-threaded runtime instead of sharing one with the shell.
pub fn install_signal_handler() -> io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let cancel = token.clone();
    thread::Builder::new()
        .name("signal-listener".into())
        .spawn(move || {
            runtime.block_on(async {
                tokio::select! {
                    _ = wait_for_signal() => {}
                    _ = cancel.cancelled() => return,
                }
                println!("\nInterrupt received, finishing after the current command (press Enter).");
                cancel.cancel();
            });
        })?;

    Ok(token)
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM, only Ctrl+C will stop the client");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = wait_for_ctrl_c() => {}
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received SIGINT (Ctrl+C), shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
