//! Application lifecycle management.
//!
//! This module owns the process state machine and coordinates startup,
//! steady-state running and graceful termination with the logging subsystem
//! and OS termination signals.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Configuration Resolution (ConfigSnapshot::from_env)
//!    ↓
//! 2. Application Construction (builder; fault handler installed)
//!    ↓                                            [Created]
//! 3. start()
//!    ↓                                            [Initializing]
//! 4. Configuration Validation        ← fatal on failure, exit 1
//!    ↓
//! 5. Setup Hooks (in order)          ← fatal on failure, exit 1
//!    ↓                                            [Running]
//! 6. Heartbeat + Main Work Pass
//!    ↓
//! [Running...]
//!    ↓
//! 7. SIGTERM / SIGINT / fatal error
//!    ↓                                            [ShuttingDown]
//! 8. Cleanup Hooks (reverse order)
//!    ↓                                            [Terminated]
//! 9. Process Exit (code 0)
//! ```
//!
//! An unhandled fault at any point is logged and terminates the process with
//! exit code 1 without running cleanup.
//!
//! # Example
//!
//! ```rust,ignore
//! use armature::config::ConfigSnapshot;
//! use armature::lifecycle::{Application, WarmUp};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::sync::RwLock;
//!
//! let app = Application::builder()
//!     .config(ConfigSnapshot::from_env())
//!     .on_setup(Arc::new(RwLock::new(WarmUp::new(Duration::from_millis(100)))), "ServiceWarmup")
//!     .build();
//!
//! app.start().await?;
//! let code = app.run_until_shutdown().await;
//! std::process::exit(code);
//! ```

mod application;
mod error;
mod fault;
mod manager;
mod shutdown;
mod traits;

pub use application::{
    Application, ApplicationBuilder, ApplicationState, EXIT_FAILURE, EXIT_SUCCESS,
};
pub use error::LifecycleError;
pub use fault::FaultHandler;
pub use manager::LifecycleManager;
pub use shutdown::{TerminationSignal, shutdown_signal};
pub use traits::{CleanupHook, SetupHook, WarmUp};
