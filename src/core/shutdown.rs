//! # OS signal to shutdown-token bridge.
//!
//! The shutdown signal is a single [`CancellationToken`] the hosting
//! process creates once and signals once. Hosts that want the usual unix
//! wiring can call [`cancel_on_termination`] instead of handling signals
//! themselves.
//!
//! Signals observed on unix: `SIGINT` (Ctrl-C), `SIGTERM` (systemd,
//! Kubernetes), `SIGQUIT`. Elsewhere: Ctrl-C via [`tokio::signal::ctrl_c`].

use tokio_util::sync::CancellationToken;

/// Waits for a termination signal, then cancels `ctx`.
///
/// Convenience wrapper for hosts without their own signal handling; the
/// token stays the single process-wide shutdown writer either way.
pub async fn cancel_on_termination(ctx: CancellationToken) -> std::io::Result<()> {
    wait_for_termination_signal().await?;
    ctx.cancel();
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. Returns `Ok(())` when
/// any signal is received, or `Err` if listener registration fails.
#[cfg(unix)]
pub async fn wait_for_termination_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
        _ = sigquit.recv() => {}
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. Returns `Ok(())` when
/// any signal is received, or `Err` if listener registration fails.
#[cfg(not(unix))]
pub async fn wait_for_termination_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
