pub mod outbound;

pub use outbound::{MailError, Mailer, OutboundEmail};
