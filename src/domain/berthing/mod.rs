//! Berthing aggregate
//!
//! A berthing binds one ship to one dock for a time window and owns the
//! cargo lines moving through customs while it is alongside.

pub mod cargo;
pub mod model;
pub mod repository;

pub use cargo::{AuditEntry, CargoDetail, CargoType, CargoUnit, CustomsStatus, NewCargo};
pub use model::{Berthing, BerthingStatus, DocumentRef, NewBerthing, SchedulePatch};
pub use repository::{BerthingFilter, BerthingRepository};
