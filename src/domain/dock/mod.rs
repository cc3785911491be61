//! Dock registry aggregate

pub mod model;
pub mod repository;

pub use model::{Dock, DockClaim, DockStatus, NewDock};
pub use repository::DockRepository;
