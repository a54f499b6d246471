//! Log-based notifier adapter.
//!
//! Used when no mail server is configured: alert messages go to the log
//! at `warn` level so they still show up on the console / journal.

use log::warn;

use crate::alerts::AlertEvent;
use crate::app::ports::{Notifier, NotifyError};

#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: u64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts logged so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self, event: &AlertEvent, message: &str) -> Result<(), NotifyError> {
        self.sent += 1;
        warn!("NOTIFY | {} | {}", event.metric, message.replace('\n', " "));
        Ok(())
    }
}
