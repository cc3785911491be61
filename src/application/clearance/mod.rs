//! Customs clearance of cargo lines

pub mod service;

pub use service::{ClearanceItem, ClearanceService};
