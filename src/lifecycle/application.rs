//! Application object and state machine.
//!
//! Provides a high-level API for wiring configuration, logging and lifecycle
//! hooks into a single supervised process.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use strum_macros::Display;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::fault::FaultHandler;
use super::manager::LifecycleManager;
use super::shutdown::shutdown_signal;
use super::traits::{CleanupHook, SetupHook};
use super::LifecycleError;
use crate::common;
use crate::config::ConfigSnapshot;
use crate::logger::{LogLevel, Logger};

/// Exit status communicated after a graceful shutdown
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for initialization failures and unhandled faults
pub const EXIT_FAILURE: i32 = 1;

/// Where the process is in its lifecycle
///
/// Owned exclusively by the [`Application`]; external callers observe it via
/// [`Application::state`] but never mutate it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApplicationState {
    Created,
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

/// The application object: owns process state and drives
/// initialize → run → shutdown
///
/// # Example
///
/// ```rust,no_run
/// use armature::lifecycle::Application;
///
/// #[tokio::main]
/// async fn main() {
///     let app = Application::builder().build();
///
///     if app.start().await.is_err() {
///         std::process::exit(armature::lifecycle::EXIT_FAILURE);
///     }
///
///     let code = app.run_until_shutdown().await;
///     std::process::exit(code);
/// }
/// ```
pub struct Application {
    config: ConfigSnapshot,
    logger: Logger,
    manager: LifecycleManager,
    state: Mutex<ApplicationState>,
    started_at: Instant,
    heartbeat_interval: Duration,
    init_timeout: Option<Duration>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    fault_handler: Option<FaultHandler>,
}

impl Application {
    /// Create a new application builder.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn state(&self) -> ApplicationState {
        *self.state.lock().expect("state lock poisoned")
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Time elapsed since the application object was constructed.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Drive the application from Created through Initializing to Running.
    ///
    /// Calling `start` while the application is already running logs a
    /// warning and returns without re-entering initialization. A validation
    /// or setup failure is fatal: the error is logged, the state becomes
    /// Terminated and the caller is expected to exit with
    /// [`EXIT_FAILURE`].
    pub async fn start(&self) -> Result<(), LifecycleError> {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            match *state {
                ApplicationState::Created => *state = ApplicationState::Initializing,
                ApplicationState::Running => {
                    drop(state);
                    self.logger.warn("Application is already running");
                    return Ok(());
                }
                current => {
                    drop(state);
                    self.logger.warn(format!("start ignored while {current}"));
                    return Ok(());
                }
            }
        }

        self.logger.info("Starting application...");

        if let Err(error) = self.initialize().await {
            self.logger.error(format!("Failed to start application: {error}"));
            self.transition(ApplicationState::Terminated);
            return Err(error);
        }

        self.transition(ApplicationState::Running);
        self.run();

        let startup_ms = self.started_at.elapsed().as_millis();
        self.logger
            .info(format!("Application started successfully in {startup_ms}ms"));
        self.logger
            .info(format!("Process ID: {}", std::process::id()));

        Ok(())
    }

    /// Validate configuration and run the setup sequence.
    async fn initialize(&self) -> Result<(), LifecycleError> {
        self.logger.info("Initializing application...");
        self.logger
            .info(format!("Environment: {}", self.config.env()));
        self.logger
            .info(format!("App Name: {}", self.config.app_name()));

        self.config.validate()?;
        self.logger.log(
            LogLevel::Debug,
            "Configuration resolved",
            Some(self.config.describe()),
        );

        match self.init_timeout {
            Some(timeout) => {
                self.manager
                    .run_setup_with_timeout(&self.logger, timeout)
                    .await?
            }
            None => self.manager.run_setup(&self.logger).await?,
        }

        self.logger.info("Application initialized successfully");
        Ok(())
    }

    /// Arm the heartbeat and perform one pass of main work.
    ///
    /// The two are independent cooperative tasks: the heartbeat repeats for
    /// as long as the application runs, the work pass executes exactly once
    /// per `run`. Both are cancelled by [`Application::shutdown`].
    fn run(&self) {
        self.logger.info("Application is running...");
        self.logger.info("Press CTRL+C to stop");

        let heartbeat = self.spawn_heartbeat();
        let work = self.spawn_work_pass();

        let mut tasks = self.tasks.lock().expect("task lock poisoned");
        tasks.push(heartbeat);
        tasks.push(work);
    }

    /// Periodic liveness log. Carries no control authority: it never
    /// triggers a state change by itself.
    fn spawn_heartbeat(&self) -> JoinHandle<()> {
        let logger = self.logger.clone();
        let started_at = self.started_at;
        let period = self.heartbeat_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick completes immediately; skip it so the first
            // heartbeat lands one full period after startup
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let uptime = started_at.elapsed().as_secs();
                logger.debug(format!("Uptime: {uptime} seconds"));
            }
        })
    }

    /// One-shot main work pass.
    fn spawn_work_pass(&self) -> JoinHandle<()> {
        let logger = self.logger.clone();

        tokio::spawn(async move {
            logger.info("Performing work...");

            let sample_id = common::generate_id(12);
            logger.debug(format!("Generated sample ID: {sample_id}"));

            match common::process_memory_rss() {
                Some(rss) => {
                    logger.debug(format!("Memory usage: {}", common::format_bytes(rss)));
                }
                None => logger.debug("Memory usage: unavailable"),
            }
        })
    }

    /// Gracefully shut the application down and report the exit code.
    ///
    /// Idempotent: once the application is shutting down or terminated,
    /// further calls perform no cleanup actions and return the same code.
    /// Signal-triggered and error-triggered shutdown both land here so
    /// cleanup logic is never duplicated.
    pub async fn shutdown(&self) -> i32 {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            if matches!(
                *state,
                ApplicationState::ShuttingDown | ApplicationState::Terminated
            ) {
                return EXIT_SUCCESS;
            }
            *state = ApplicationState::ShuttingDown;
        }

        self.logger.info("Shutting down application...");

        for task in self.tasks.lock().expect("task lock poisoned").drain(..) {
            task.abort();
        }

        self.manager.run_cleanup(&self.logger).await;

        if let Some(handler) = &self.fault_handler {
            handler.disarm();
        }

        self.logger.info("Application shutdown complete");
        self.transition(ApplicationState::Terminated);
        EXIT_SUCCESS
    }

    /// Block until a termination signal arrives, then shut down.
    pub async fn run_until_shutdown(&self) -> i32 {
        let signal = shutdown_signal().await;
        self.logger.info(format!("{signal} received"));
        self.shutdown().await
    }

    fn transition(&self, to: ApplicationState) {
        *self.state.lock().expect("state lock poisoned") = to;
    }
}

/// Fluent builder for [`Application`]
///
/// Construction is infallible; configuration problems surface when
/// [`Application::start`] validates the snapshot.
pub struct ApplicationBuilder {
    config: Option<ConfigSnapshot>,
    logger: Option<Logger>,
    manager: LifecycleManager,
    heartbeat_interval: Option<Duration>,
    init_timeout: Option<Duration>,
    install_fault_handler: bool,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: None,
            manager: LifecycleManager::new(),
            heartbeat_interval: None,
            init_timeout: None,
            install_fault_handler: true,
        }
    }

    /// Use an explicit configuration snapshot instead of resolving one from
    /// the environment.
    pub fn config(mut self, config: ConfigSnapshot) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an explicit logger instead of one derived from the configuration.
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Register a setup hook, run during initialization.
    pub fn on_setup<T>(mut self, hook: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: SetupHook + 'static,
    {
        self.manager.register_setup(hook, name);
        self
    }

    /// Register a cleanup hook, run during graceful shutdown.
    pub fn on_cleanup<T>(mut self, hook: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: CleanupHook + 'static,
    {
        self.manager.register_cleanup(hook, name);
        self
    }

    /// Register one component for both setup and cleanup.
    pub fn register_lifecycle<T>(self, hook: Arc<RwLock<T>>, name: impl Into<String>) -> Self
    where
        T: SetupHook + CleanupHook + 'static,
    {
        let name = name.into();
        self.on_setup(Arc::clone(&hook), name.clone())
            .on_cleanup(hook, name)
    }

    /// Override the heartbeat period (defaults to the configured value).
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Bound the total time the setup sequence may take.
    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }

    /// Whether to install the process fault handler (defaults to true).
    /// Embedders running several applications in one process, and tests,
    /// can opt out.
    pub fn fault_handler(mut self, install: bool) -> Self {
        self.install_fault_handler = install;
        self
    }

    /// Build the application. The state starts as Created; nothing runs
    /// until [`Application::start`] is called.
    pub fn build(self) -> Application {
        let config = self.config.unwrap_or_else(ConfigSnapshot::from_env);
        let logger = self
            .logger
            .unwrap_or_else(|| Logger::from_config(&config));
        let heartbeat_interval = self
            .heartbeat_interval
            .unwrap_or_else(|| config.heartbeat_interval());
        let fault_handler = self
            .install_fault_handler
            .then(|| FaultHandler::install(logger.clone()));

        Application {
            config,
            logger,
            manager: self.manager,
            state: Mutex::new(ApplicationState::Created),
            started_at: Instant::now(),
            heartbeat_interval,
            init_timeout: self.init_timeout,
            tasks: Mutex::new(Vec::new()),
            fault_handler,
        }
    }
}
