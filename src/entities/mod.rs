//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod product;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
