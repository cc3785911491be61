//! Database entities module

pub mod berthing;
pub mod cargo_item;
pub mod dock;
pub mod notification;
pub mod ship;
pub mod user;

pub use berthing::Entity as Berthing;
pub use cargo_item::Entity as CargoItem;
pub use dock::Entity as Dock;
pub use notification::Entity as Notification;
pub use ship::Entity as Ship;
pub use user::Entity as User;
