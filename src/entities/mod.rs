//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod client;
pub mod promotion;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use promotion::{Column as PromotionColumn, Entity as Promotion, Model as PromotionModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionKind,
};
