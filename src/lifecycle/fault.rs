//! Central handler for faults no other code catches.
//!
//! Installed once when the application is constructed and rendered inert at
//! shutdown, replacing ambient process-wide hooks that would outlive the
//! application object. While armed, an escaping panic is logged at error
//! level with full detail and the process exits with a failure status
//! immediately, bypassing graceful shutdown. The fault is not retried.

use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logger::Logger;

use super::application::EXIT_FAILURE;

/// Handle to the installed process fault hook
pub struct FaultHandler {
    armed: Arc<AtomicBool>,
}

impl FaultHandler {
    /// Install the panic hook. Faults are reported through `logger`; the
    /// previously installed hook keeps handling faults once this handler is
    /// disarmed.
    pub fn install(logger: Logger) -> Self {
        let armed = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&armed);
        let previous = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            if !flag.load(Ordering::SeqCst) {
                previous(info);
                return;
            }

            let message = info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown panic payload");

            let detail = match info.location() {
                Some(location) => format!(
                    "Unhandled fault: {message} at {}:{}",
                    location.file(),
                    location.line()
                ),
                None => format!("Unhandled fault: {message}"),
            };

            // The sink is synchronous, so the line is fully written before
            // the process terminates.
            logger.error(detail);
            std::process::exit(EXIT_FAILURE);
        }));

        Self { armed }
    }

    /// Render the hook inert. Subsequent panics fall through to whatever
    /// hook was installed before this one.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}
