//! Client entity - A loyalty customer of the store.
//!
//! Clients are identified either by their CPF or by a store-assigned 4-digit `code`;
//! both columns carry unique indexes. `points` and `bonus` are only ever changed by
//! purchases and withdrawals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name as given at registration
    pub name: String,
    /// CPF, digits only (11 characters)
    #[sea_orm(unique)]
    pub cpf: String,
    /// Store-assigned 4-digit code, zero padded
    #[sea_orm(unique)]
    pub code: String,
    /// Contact phone as typed by staff
    pub phone: String,
    /// Accumulated loyalty points
    pub points: i64,
    /// Redeemable bonus credit in reais
    pub bonus: f64,
    /// When the client was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many ledger entries
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
