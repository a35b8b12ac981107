use std::{
    future::Future,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use derive_more::Debug;
use futures::FutureExt;
use tokio::signal::unix::{Signal, SignalKind};
use tracing::info;

/// Resolves once the process receives SIGINT or SIGTERM.
#[derive(Debug)]
pub struct ShutdownSignal {
    /// A future that resolves when a SIGINT signal is received.
    #[debug(skip)]
    ctrl_c: Pin<Box<dyn Future<Output = io::Result<()>> + Send>>,
    /// A stream of SIGTERM signals.
    term_signal: Signal,
}

impl ShutdownSignal {
    /// Install the signal handlers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> io::Result<Self> {
        let ctrl_c = Box::pin(tokio::signal::ctrl_c());
        let term_signal = tokio::signal::unix::signal(SignalKind::terminate())?;

        Ok(Self { ctrl_c, term_signal })
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.ctrl_c.poll_unpin(cx).is_ready() {
            info!("Received SIGINT, shutting down");
            return Poll::Ready(());
        }

        if this.term_signal.poll_recv(cx).is_ready() {
            info!("Received SIGTERM, shutting down");
            return Poll::Ready(());
        }

        Poll::Pending
    }
}
