//! OS signal handling.
//!
//! - SIGINT / SIGTERM end the process gracefully
//! - SIGHUP asks for a configuration refresh (Unix only)

/// Resolve when Ctrl+C or SIGTERM is received.
pub async fn terminate() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
    tracing::info!("Shutdown signal received");
}

/// Stream of SIGHUP notifications. Never fires where SIGHUP does not exist
/// or the handler could not be installed.
pub struct Hangup {
    #[cfg(unix)]
    inner: Option<tokio::signal::unix::Signal>,
}

impl Hangup {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            inner: install_hangup(),
        }
    }

    /// Wait for the next SIGHUP.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        {
            if let Some(stream) = self.inner.as_mut() {
                if stream.recv().await.is_some() {
                    return;
                }
                self.inner = None;
            }
        }

        std::future::pending::<()>().await
    }
}

#[cfg(unix)]
fn install_hangup() -> Option<tokio::signal::unix::Signal> {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::hangup()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for SIGHUP, reload on signal disabled");
            None
        }
    }
}

impl Default for Hangup {
    fn default() -> Self {
        Self::new()
    }
}
