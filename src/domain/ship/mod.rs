//! Ship registry aggregate
//!
//! Static reference data for vessels. No workflow state.

pub mod model;
pub mod repository;

pub use model::{NewShip, Ship, ShipType};
pub use repository::ShipRepository;
