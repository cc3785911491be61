pub mod berthings;
pub mod customs;
pub mod docks;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod request_id;
pub mod ships;
