//! Reference binary: wires the configuration snapshot, logger and lifecycle
//! hooks together and supervises the process from cold start to exit.

use std::time::Duration;

use armature::prelude::*;

#[tokio::main]
async fn main() {
    let config = ConfigSnapshot::from_env();
    let logger = Logger::from_config(&config);

    let app = Application::builder()
        .config(config)
        .logger(logger)
        .on_setup(
            Arc::new(RwLock::new(WarmUp::new(Duration::from_millis(100)))),
            "ServiceWarmup",
        )
        .build();

    if app.start().await.is_err() {
        // the failure has already been logged by the application
        std::process::exit(EXIT_FAILURE);
    }

    let code = app.run_until_shutdown().await;
    std::process::exit(code);
}
