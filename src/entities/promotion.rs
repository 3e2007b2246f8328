//! Promotion entity - A named points multiplier campaign.
//!
//! A promotion applies only while `active` is set and the current instant lies inside
//! the optional `[starts_at, ends_at]` window.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Promotion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    /// Unique identifier for the promotion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Semana do Cliente")
    pub name: String,
    /// Integer factor applied to the purchase amount, at least 1
    pub multiplier: i32,
    /// Stored on/off switch controlled by staff
    pub active: bool,
    /// First instant the promotion applies, if bounded
    pub starts_at: Option<DateTimeUtc>,
    /// Last instant the promotion applies, if bounded
    pub ends_at: Option<DateTimeUtc>,
    /// When the promotion was created
    pub created_at: DateTimeUtc,
}

/// Promotions are not referenced by other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
