//! Signal handling.
//!
//! SIGINT/Ctrl-C cancels the token handed to in-flight probes.

use tokio_util::sync::CancellationToken;

/// Cancel `token` on Ctrl-C. Returns immediately.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                    return;
                }
                tracing::info!("Interrupt received, cancelling");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}
