//! Default mailer: writes the message to the log instead of sending it

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{MailError, Mailer, OutboundEmail};

pub struct TracingMailer {
    sender: String,
}

impl TracingMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if !email.recipient.contains('@') {
            return Err(MailError::InvalidRecipient(email.recipient));
        }
        info!(
            from = %self.sender,
            to = %email.recipient,
            subject = %email.subject,
            body_len = email.body.len(),
            "Email relayed"
        );
        Ok(())
    }
}
