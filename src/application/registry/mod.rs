//! Ship and dock reference data

pub mod dock_service;
pub mod ship_service;

pub use dock_service::DockService;
pub use ship_service::ShipService;
