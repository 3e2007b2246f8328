//! Transaction ledger - Append-only record of purchases and withdrawals.
//!
//! Entries are written by the purchase and withdrawal flows in the same database
//! transaction as the balance update. There is deliberately no update or delete.

use crate::{
    entities::{Client, Transaction, TransactionKind, transaction},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Default number of entries shown in the history view
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

/// A ledger entry joined with the client it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The ledger row
    pub transaction: transaction::Model,
    /// Client name, or a placeholder if the client row is missing
    pub client_name: String,
    /// Client code, empty if the client row is missing
    pub client_code: String,
}

/// Arguments for appending a ledger entry.
#[derive(Debug, Clone, Copy)]
pub struct NewTransaction {
    /// Client the entry belongs to
    pub client_id: i64,
    /// Purchase value or withdrawn bonus, in reais
    pub amount: f64,
    /// Signed points delta
    pub points_generated: i64,
    /// Multiplier applied (1 for withdrawals)
    pub multiplier: i32,
    /// Purchase or withdrawal
    pub kind: TransactionKind,
    /// Timestamp of the event
    pub created_at: DateTime<Utc>,
}

/// Appends an entry to the ledger.
pub async fn record_transaction<C>(db: &C, entry: NewTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let model = transaction::ActiveModel {
        client_id: Set(entry.client_id),
        amount: Set(entry.amount),
        points_generated: Set(entry.points_generated),
        multiplier: Set(entry.multiplier),
        kind: Set(entry.kind),
        created_at: Set(entry.created_at),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

fn into_entries(
    rows: Vec<(transaction::Model, Option<crate::entities::ClientModel>)>,
) -> Vec<LedgerEntry> {
    rows.into_iter()
        .map(|(transaction, client)| {
            let (client_name, client_code) =
                client.map_or_else(|| ("(removed)".to_string(), String::new()), |c| (c.name, c.code));
            LedgerEntry {
                transaction,
                client_name,
                client_code,
            }
        })
        .collect()
}

/// Most recent ledger entries across all clients, newest first.
pub async fn recent_transactions(db: &DatabaseConnection, limit: u64) -> Result<Vec<LedgerEntry>> {
    let rows = Transaction::find()
        .find_also_related(Client)
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(into_entries(rows))
}

/// All ledger entries of one client, newest first.
pub async fn transactions_for_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::ClientId.eq(client_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ledger entries of one kind recorded in `[start, end)`, oldest first.
pub async fn transactions_between(
    db: &DatabaseConnection,
    kind: TransactionKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<LedgerEntry>> {
    let rows = Transaction::find()
        .find_also_related(Client)
        .filter(transaction::Column::Kind.eq(kind))
        .filter(transaction::Column::CreatedAt.gte(start))
        .filter(transaction::Column::CreatedAt.lt(end))
        .order_by_asc(transaction::Column::CreatedAt)
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;
    Ok(into_entries(rows))
}
