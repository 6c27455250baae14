//! Graceful shutdown on Ctrl+C or SIGTERM.

use std::{fmt, io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
#[error("failed to install {signal} handler")]
pub(crate) struct ShutdownSignalError {
    signal: Signal,
    #[source]
    source: io::Error,
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "Ctrl+C",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Wait for a stop signal, then let in-flight requests finish for up to
/// `grace` before the server is dropped.
pub(crate) async fn listen(handle: ServerHandle, grace: Duration) -> Result<(), ShutdownSignalError> {
    let received = tokio::select! {
        result = signal::ctrl_c() => result.map(|()| Signal::Interrupt).map_err(|source| {
            ShutdownSignalError { signal: Signal::Interrupt, source }
        })?,
        result = terminate() => result?,
    };

    info!(signal = %received, grace_secs = grace.as_secs(), "shutting down");

    handle.stop_graceful(grace);

    Ok(())
}

#[cfg(unix)]
async fn terminate() -> Result<Signal, ShutdownSignalError> {
    let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(
        |source| ShutdownSignalError {
            signal: Signal::Terminate,
            source,
        },
    )?;

    stream.recv().await;

    Ok(Signal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<Signal, ShutdownSignalError> {
    std::future::pending().await
}
