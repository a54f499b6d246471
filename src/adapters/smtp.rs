//! SMTP notifier adapter.
//!
//! Sends each alert as a plain-text mail through `lettre`'s blocking SMTP
//! transport.  The connection is plain SMTP (the reef controller talks to
//! a LAN relay), opened per message.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

use crate::alerts::{ALERT_SUBJECT, AlertEvent};
use crate::app::ports::{Notifier, NotifyError};
use crate::config::SmtpConfig;

pub struct SmtpNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    /// Validate addresses up front so a typo fails at startup, not at
    /// the first alert.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = config
            .sender
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(format!("{}: {}", config.sender, e)))?;
        let to = config
            .receiver
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(format!("{}: {}", config.receiver, e)))?;
        let transport = SmtpTransport::builder_dangerous(config.server.as_str())
            .port(config.port)
            .build();
        info!(
            "SmtpNotifier: {}:{} -> {}",
            config.server, config.port, config.receiver
        );
        Ok(Self {
            from,
            to,
            transport,
        })
    }

    fn build(&self, event: &AlertEvent) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(ALERT_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(event.body())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&mut self, event: &AlertEvent, _message: &str) -> Result<(), NotifyError> {
        let email = self.build(event)?;
        self.transport
            .send(&email)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        info!("SmtpNotifier: sent {} alert", event.metric);
        Ok(())
    }
}
