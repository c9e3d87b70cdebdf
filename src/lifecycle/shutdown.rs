//! OS termination signal handling.
//!
//! Both standard termination signals resolve to the same value so that
//! signal-triggered and error-triggered shutdown converge on one
//! `shutdown()` entry point.

use strum_macros::Display;
use tokio::signal;

/// Which termination signal ended the wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TerminationSignal {
    #[strum(serialize = "SIGINT")]
    Interrupt,
    #[strum(serialize = "SIGTERM")]
    Terminate,
}

/// Complete when a termination signal is received.
///
/// Listens for Ctrl+C (SIGINT) and, on Unix, SIGTERM. There is no distinct
/// behavior per signal beyond reporting which one arrived.
///
/// # Example
///
/// ```rust,ignore
/// let signal = armature::lifecycle::shutdown_signal().await;
/// logger.info(format!("{signal} received"));
/// app.shutdown().await;
/// ```
pub async fn shutdown_signal() -> TerminationSignal {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => TerminationSignal::Interrupt,
        _ = terminate => TerminationSignal::Terminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_render_their_conventional_names() {
        assert_eq!(TerminationSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(TerminationSignal::Terminate.to_string(), "SIGTERM");
    }
}
