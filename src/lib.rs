//! # Armature
//!
//! A lightweight application scaffold with lifecycle management for Rust
//! services.
//!
//! Armature wires configuration loading, leveled logging and startup/shutdown
//! hooks into a single supervised application object, so small services get a
//! predictable cold-start-to-graceful-exit story without inventing one.
//!
//! ## Features
//!
//! - **Lifecycle state machine**: Created → Initializing → Running →
//!   ShuttingDown → Terminated, with one owner and explicit transitions
//! - **Graceful shutdown**: SIGINT and SIGTERM converge on a single,
//!   idempotent `shutdown()` entry point
//! - **Setup/cleanup hooks**: ordered async setup, reverse-ordered cleanup
//! - **Leveled logging**: threshold fixed at construction, pure formatting,
//!   swappable sinks
//! - **Immutable configuration**: resolved once from the environment,
//!   validated before anything runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armature::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConfigSnapshot::from_env();
//!     let logger = Logger::from_config(&config);
//!
//!     let app = Application::builder()
//!         .config(config)
//!         .logger(logger)
//!         .on_setup(
//!             Arc::new(RwLock::new(WarmUp::new(Duration::from_millis(100)))),
//!             "ServiceWarmup",
//!         )
//!         .build();
//!
//!     if app.start().await.is_err() {
//!         std::process::exit(EXIT_FAILURE);
//!     }
//!
//!     let code = app.run_until_shutdown().await;
//!     std::process::exit(code);
//! }
//! ```

pub mod common;
pub mod config;
pub mod lifecycle;
pub mod logger;

// Re-export core types
pub use config::{ConfigError, ConfigSnapshot, ConfigValue, Environment};
pub use lifecycle::{
    Application, ApplicationBuilder, ApplicationState, CleanupHook, LifecycleError,
    LifecycleManager, SetupHook, TerminationSignal, WarmUp, shutdown_signal,
};
pub use logger::{LogLevel, LogRecord, LogSink, Logger, MemorySink, OutputStream, format_record};

/// Prelude module for convenient imports
///
/// ```
/// use armature::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{format_bytes, generate_id};
    pub use crate::config::{ConfigError, ConfigSnapshot, ConfigValue, Environment};
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, ApplicationState, CleanupHook, EXIT_FAILURE,
        EXIT_SUCCESS, LifecycleError, LifecycleManager, SetupHook, TerminationSignal, WarmUp,
        shutdown_signal,
    };
    pub use crate::logger::{LogLevel, LogSink, Logger, MemorySink, OutputStream};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio::sync::RwLock;
}
