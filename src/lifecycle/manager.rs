//! Hook registry and ordered execution.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::{CleanupHook, LifecycleError, SetupHook};
use crate::logger::Logger;

/// A registered hook with the name it reports in logs and errors
struct RegisteredHook<T: ?Sized> {
    hook: Arc<RwLock<T>>,
    name: String,
}

impl<T: ?Sized> RegisteredHook<T> {
    fn new(hook: Arc<RwLock<T>>, name: impl Into<String>) -> Self {
        Self {
            hook,
            name: name.into(),
        }
    }
}

/// Ordered registry of setup and cleanup hooks
///
/// Setup hooks run in registration order and abort on the first failure.
/// Cleanup hooks run in reverse registration order and keep going past
/// failures, so one broken component cannot block the teardown of the rest.
pub struct LifecycleManager {
    setup_hooks: Vec<RegisteredHook<dyn SetupHook>>,
    cleanup_hooks: Vec<RegisteredHook<dyn CleanupHook>>,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            setup_hooks: Vec::new(),
            cleanup_hooks: Vec::new(),
        }
    }

    /// Register a setup hook. Shared ownership allows the same component to
    /// also be registered for cleanup.
    pub fn register_setup<T>(&mut self, hook: Arc<RwLock<T>>, name: impl Into<String>)
    where
        T: SetupHook + 'static,
    {
        self.setup_hooks.push(RegisteredHook::new(hook, name));
    }

    /// Register a cleanup hook.
    pub fn register_cleanup<T>(&mut self, hook: Arc<RwLock<T>>, name: impl Into<String>)
    where
        T: CleanupHook + 'static,
    {
        self.cleanup_hooks.push(RegisteredHook::new(hook, name));
    }

    /// Run all setup hooks in registration order.
    ///
    /// Stops at the first failure; the error names the hook that failed.
    pub async fn run_setup(&self, logger: &Logger) -> Result<(), LifecycleError> {
        for registered in &self.setup_hooks {
            logger.debug(format!("Setting up: {}", registered.name));
            let mut hook = registered.hook.write().await;
            hook.on_setup()
                .await
                .map_err(|source| LifecycleError::Setup {
                    hook: registered.name.clone(),
                    source,
                })?;
            logger.debug(format!("Setup complete: {}", registered.name));
        }
        Ok(())
    }

    /// Run all setup hooks with a bound on the total setup time.
    pub async fn run_setup_with_timeout(
        &self,
        logger: &Logger,
        timeout: Duration,
    ) -> Result<(), LifecycleError> {
        tokio::time::timeout(timeout, self.run_setup(logger))
            .await
            .map_err(|_| LifecycleError::SetupTimeout { timeout })?
    }

    /// Run all cleanup hooks in reverse registration order.
    ///
    /// Failures are logged and do not stop the remaining hooks.
    pub async fn run_cleanup(&self, logger: &Logger) {
        for registered in self.cleanup_hooks.iter().rev() {
            logger.debug(format!("Cleaning up: {}", registered.name));
            let mut hook = registered.hook.write().await;
            if let Err(error) = hook.on_cleanup().await {
                logger.error(format!("Cleanup failed for {}: {error:#}", registered.name));
            }
        }
    }

    pub fn setup_hook_count(&self) -> usize {
        self.setup_hooks.len()
    }

    pub fn cleanup_hook_count(&self) -> usize {
        self.cleanup_hooks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{LogLevel, LogSink, MemorySink};
    use async_trait::async_trait;

    fn quiet_logger() -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Logger::with_sink(LogLevel::Debug, Arc::clone(&sink) as Arc<dyn LogSink>), sink)
    }

    struct Recorder {
        id: usize,
        order: Arc<std::sync::Mutex<Vec<usize>>>,
        fail_setup: bool,
    }

    #[async_trait]
    impl SetupHook for Recorder {
        async fn on_setup(&mut self) -> anyhow::Result<()> {
            if self.fail_setup {
                anyhow::bail!("connection refused");
            }
            self.order.lock().unwrap().push(self.id);
            Ok(())
        }
    }

    #[async_trait]
    impl CleanupHook for Recorder {
        async fn on_cleanup(&mut self) -> anyhow::Result<()> {
            self.order.lock().unwrap().push(self.id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn setup_runs_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (logger, _) = quiet_logger();
        let mut manager = LifecycleManager::new();

        for id in 0..3 {
            let hook = Arc::new(RwLock::new(Recorder {
                id,
                order: Arc::clone(&order),
                fail_setup: false,
            }));
            manager.register_setup(hook, format!("Hook{id}"));
        }

        manager.run_setup(&logger).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn cleanup_runs_in_reverse_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (logger, _) = quiet_logger();
        let mut manager = LifecycleManager::new();

        for id in 0..3 {
            let hook = Arc::new(RwLock::new(Recorder {
                id,
                order: Arc::clone(&order),
                fail_setup: false,
            }));
            manager.register_cleanup(hook, format!("Hook{id}"));
        }

        manager.run_cleanup(&logger).await;
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn setup_failure_names_the_hook() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (logger, _) = quiet_logger();
        let mut manager = LifecycleManager::new();

        manager.register_setup(
            Arc::new(RwLock::new(Recorder {
                id: 0,
                order: Arc::clone(&order),
                fail_setup: true,
            })),
            "Database",
        );
        manager.register_setup(
            Arc::new(RwLock::new(Recorder {
                id: 1,
                order: Arc::clone(&order),
                fail_setup: false,
            })),
            "Cache",
        );

        let err = manager.run_setup(&logger).await.unwrap_err();
        match err {
            LifecycleError::Setup { hook, .. } => assert_eq!(hook, "Database"),
            other => panic!("unexpected error: {other}"),
        }
        // the failure aborted the sequence before the second hook ran
        assert!(order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cleanup_continues_past_failures() {
        struct Failing;

        #[async_trait]
        impl CleanupHook for Failing {
            async fn on_cleanup(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("still busy")
            }
        }

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (logger, sink) = quiet_logger();
        let mut manager = LifecycleManager::new();

        manager.register_cleanup(
            Arc::new(RwLock::new(Recorder {
                id: 0,
                order: Arc::clone(&order),
                fail_setup: false,
            })),
            "Survivor",
        );
        manager.register_cleanup(Arc::new(RwLock::new(Failing)), "Broken");

        manager.run_cleanup(&logger).await;

        assert_eq!(*order.lock().unwrap(), vec![0]);
        assert!(sink.contains("Cleanup failed for Broken"));
    }

    #[tokio::test]
    async fn setup_timeout_is_reported() {
        struct Slow;

        #[async_trait]
        impl SetupHook for Slow {
            async fn on_setup(&mut self) -> anyhow::Result<()> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }

        let (logger, _) = quiet_logger();
        let mut manager = LifecycleManager::new();
        manager.register_setup(Arc::new(RwLock::new(Slow)), "Slow");

        let err = manager
            .run_setup_with_timeout(&logger, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::SetupTimeout { .. }));
    }

    #[tokio::test]
    async fn hook_counts_reflect_registrations() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        let hook = Arc::new(RwLock::new(Recorder {
            id: 0,
            order,
            fail_setup: false,
        }));

        manager.register_setup(Arc::clone(&hook), "Shared");
        manager.register_cleanup(hook, "Shared");

        assert_eq!(manager.setup_hook_count(), 1);
        assert_eq!(manager.cleanup_hook_count(), 1);
    }
}
