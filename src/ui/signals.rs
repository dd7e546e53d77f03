use crate::error::{Result, SfcJsError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ctrl+C flag checked between files. A second Ctrl+C exits immediately.
#[derive(Clone)]
pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let message_shown = AtomicBool::new(false);

        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !message_shown.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping after the current file... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(130);
            }
        })
        .map_err(|e| SfcJsError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self { running })
    }

    /// No signal handler registration.
    pub fn new_for_test() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(SfcJsError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::new_for_test())
    }
}
