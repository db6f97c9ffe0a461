//! Report delivery adapters

mod telegram;

pub use telegram::{DEFAULT_API_BASE, TelegramNotifier};

use async_trait::async_trait;
use careers_watch_domain::{Notifier, NotifyError};

/// Stub notifier for testing
pub struct StubNotifier {
    enabled: bool,
    fail: bool,
    sent: std::sync::Mutex<Vec<String>>,
}

impl StubNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            fail: false,
            sent: std::sync::Mutex::new(vec![]),
        }
    }

    /// Create an enabled stub whose deliveries always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(true)
        }
    }

    /// Get all reports that were delivered
    pub fn get_sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }
        if self.fail {
            return Err(NotifyError::Network("stub delivery failure".to_string()));
        }

        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn channel(&self) -> &'static str {
        "stub"
    }
}
