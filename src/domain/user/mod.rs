//! User directory
//!
//! Users are issued by the identity provider; this aggregate only mirrors
//! what the workflow needs: role for fan-out targeting and email for relay.

pub mod model;
pub mod repository;

pub use model::{User, UserRole};
pub use repository::UserRepository;
