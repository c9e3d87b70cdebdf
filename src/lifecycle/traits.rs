//! Lifecycle hook traits
//!
//! These traits define the contract for components that need to participate
//! in application startup and shutdown.

use std::time::Duration;

use async_trait::async_trait;

/// Called during `initialize()`, before the application is marked Running
///
/// Hooks run in registration order; each may take arbitrary but bounded time.
/// Any failure aborts startup and is fatal; it is not retried.
///
/// Use this hook to:
/// - Establish database connections
/// - Warm up caches
/// - Create external service clients
///
/// # Example
///
/// ```rust,ignore
/// use armature::lifecycle::SetupHook;
/// use async_trait::async_trait;
///
/// #[async_trait]
/// impl SetupHook for DatabasePool {
///     async fn on_setup(&mut self) -> anyhow::Result<()> {
///         self.pool = connect(&self.url).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SetupHook: Send + Sync {
    /// Called once during initialization, before the application runs.
    async fn on_setup(&mut self) -> anyhow::Result<()>;
}

/// Called during `shutdown()`, after the application stops running
///
/// Hooks run in **reverse** registration order so later components are torn
/// down before the ones they depend on. A failing cleanup hook is logged and
/// the remaining hooks still run.
///
/// Use this hook to:
/// - Close held resources
/// - Flush pending operations
/// - Release external handles
#[async_trait]
pub trait CleanupHook: Send + Sync {
    /// Called once during graceful shutdown.
    async fn on_cleanup(&mut self) -> anyhow::Result<()>;
}

/// Setup step that waits a fixed delay, standing in for service warm-up.
///
/// The reference application registers one of these as its only setup step;
/// real applications replace it with hooks doing actual work.
#[derive(Debug, Clone, Copy)]
pub struct WarmUp {
    delay: Duration,
}

impl WarmUp {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SetupHook for WarmUp {
    async fn on_setup(&mut self) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
