//! Transaction entity - The append-only loyalty ledger.
//!
//! Each row records one purchase (positive `points_generated`) or one bonus
//! withdrawal (negative `points_generated`, `multiplier` fixed at 1).
//! Rows are never updated or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ledger event
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TransactionKind {
    /// Points accrued from a purchase
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Bonus credit redeemed by the client
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

impl TransactionKind {
    /// Lower-case label used in reports and replies
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Withdrawal => "withdrawal",
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the client this entry belongs to
    pub client_id: i64,
    /// Purchase value or bonus withdrawn, in reais
    pub amount: f64,
    /// Points added (purchase) or removed (withdrawal, negative)
    pub points_generated: i64,
    /// Multiplier applied to the purchase (1 for withdrawals)
    pub multiplier: i32,
    /// Purchase or withdrawal
    pub kind: TransactionKind,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
