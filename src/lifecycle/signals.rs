//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT or SIGTERM
//! - Report which one arrived so the shutdown log names it
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failed SIGTERM registration degrades to SIGINT only, it is not fatal
//! - Later signals are ignored; the drain deadline bounds shutdown anyway

use std::fmt;

/// A signal that requests termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolve when the process is asked to terminate.
pub async fn wait_for_termination() -> TerminationSignal {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = interrupt() => TerminationSignal::Interrupt,
                    _ = terminate.recv() => TerminationSignal::Terminate,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for SIGINT only");
                interrupt().await;
                TerminationSignal::Interrupt
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await;
        TerminationSignal::Interrupt
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
