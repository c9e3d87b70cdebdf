//! Lifecycle-specific error types

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while driving the application lifecycle
///
/// Every variant is fatal during startup: the application logs it and
/// terminates with a failure exit code instead of retrying.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The configuration snapshot failed validation
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A setup hook failed
    #[error("setup failed for {hook}: {source}")]
    Setup {
        /// Name of the hook that failed
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    /// The setup sequence exceeded its configured bound
    #[error("setup did not complete within {timeout:?}")]
    SetupTimeout { timeout: Duration },
}
