//! Notification fan-out, the user inbox and the email relay

pub mod email_relay;
pub mod fanout;
pub mod inbox;

pub use email_relay::{start_email_relay, EmailRelayOptions};
pub use fanout::{Audience, NotificationFanout};
pub use inbox::NotificationService;
