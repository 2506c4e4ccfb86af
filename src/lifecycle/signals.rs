//! OS signal handling.
//!
//! SIGTERM and SIGINT request shutdown; SIGHUP requests a re-read of the
//! feature params file.

/// What an OS signal asks the daemon to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Reload,
}

/// Wait for the next relevant signal.
#[cfg(unix)]
pub async fn next_signal() -> std::io::Result<Signal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    let received = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            Signal::Shutdown
        }
        _ = terminate.recv() => Signal::Shutdown,
        _ = hangup.recv() => Signal::Reload,
    };
    tracing::info!(signal = ?received, "Signal received");
    Ok(received)
}

#[cfg(not(unix))]
pub async fn next_signal() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = ?Signal::Shutdown, "Signal received");
    Ok(Signal::Shutdown)
}
