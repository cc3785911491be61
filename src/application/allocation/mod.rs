//! Berth allocation engine

pub mod service;

pub use service::{BerthAllocationService, BerthingUpdate};
