//! Purchase flow - Accrues points for a purchase against a client.
//!
//! Lookup, arithmetic, balance write and ledger append run inside one database
//! transaction. A missing client is reported as `Error::ClientNotFound` so the
//! caller can collect registration details and retry with
//! [`register_purchase_for_new_client`].

use crate::{
    core::{
        client,
        loyalty::{Balance, LoyaltyRules, PurchaseOutcome, validate_amount},
        promotion::effective_multiplier,
        transaction::{NewTransaction, record_transaction},
    },
    entities::{TransactionKind, client as client_entity, promotion, transaction},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::fmt::Write;
use tracing::{info, instrument};

/// Everything staff need to confirm a purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    /// The client with updated balances
    pub client: client_entity::Model,
    /// Points and bonus computation
    pub outcome: PurchaseOutcome,
    /// Name of the promotion that was applied, if any
    pub promotion_name: Option<String>,
    /// The ledger entry that was appended
    pub transaction: transaction::Model,
}

impl PurchaseReceipt {
    /// Multi-line confirmation text: points generated, promotion, totals, bonus granted
    /// and the client's code for future purchases.
    pub fn summary(&self) -> Result<String> {
        let mut text = String::new();
        writeln!(
            &mut text,
            "**{} points generated**",
            self.outcome.points_generated
        )?;
        if let Some(name) = &self.promotion_name {
            writeln!(
                &mut text,
                "🎉 Promotion {}x applied ({name})",
                self.outcome.multiplier
            )?;
        }
        writeln!(&mut text, "Total points: {}", self.outcome.new_points)?;
        if self.outcome.bonus_generated > 0.0 {
            writeln!(
                &mut text,
                "💰 Bonus of R$ {:.2} granted!",
                self.outcome.bonus_generated
            )?;
        }
        write!(&mut text, "Client code: **{}**", self.client.code)?;
        Ok(text)
    }
}

/// Lookup, balance write and ledger append on an open transaction.
async fn accrue<C>(
    conn: &C,
    rules: &LoyaltyRules,
    identifier: &str,
    amount: f64,
    multiplier: i32,
    now: DateTime<Utc>,
) -> Result<(client_entity::Model, PurchaseOutcome, transaction::Model)>
where
    C: ConnectionTrait,
{
    let current = client::require_client(conn, identifier).await?;
    let outcome = rules.apply_purchase(
        Balance {
            points: current.points,
            bonus: current.bonus,
        },
        amount,
        multiplier,
    )?;

    let updated =
        client::update_balances(conn, &current, outcome.new_points, outcome.new_bonus).await?;

    let transaction = record_transaction(
        conn,
        NewTransaction {
            client_id: current.id,
            amount,
            points_generated: outcome.points_generated,
            multiplier,
            kind: TransactionKind::Purchase,
            created_at: now,
        },
    )
    .await?;

    Ok((updated, outcome, transaction))
}

fn promotion_label(promotion: Option<&promotion::Model>, multiplier: i32) -> Option<String> {
    promotion
        .filter(|_| multiplier > 1)
        .map(|p| p.name.clone())
}

/// Registers a purchase for the client identified by `identifier` (CPF or code).
///
/// The selected promotion's multiplier is used only if the promotion is valid at
/// `now`; otherwise the purchase accrues at 1x.
///
/// # Errors
/// Returns an error if:
/// - The amount is not a positive, finite, whole number of cents
/// - No client matches the identifier (`Error::ClientNotFound`)
/// - The client's balance changed concurrently (`Error::ConcurrentUpdate`)
/// - The database operation fails
#[instrument(skip(db, rules, promotion), fields(promotion_id = promotion.map(|p| p.id)))]
pub async fn register_purchase(
    db: &DatabaseConnection,
    rules: &LoyaltyRules,
    identifier: &str,
    amount: f64,
    promotion: Option<&promotion::Model>,
    now: DateTime<Utc>,
) -> Result<PurchaseReceipt> {
    validate_amount(amount)?;

    let multiplier = effective_multiplier(promotion, now);

    let txn = db.begin().await?;
    let (updated, outcome, transaction) =
        accrue(&txn, rules, identifier, amount, multiplier, now).await?;
    txn.commit().await?;

    info!(
        client_id = updated.id,
        points_generated = outcome.points_generated,
        multiplier,
        new_points = outcome.new_points,
        "Purchase registered"
    );

    Ok(PurchaseReceipt {
        client: updated,
        outcome,
        promotion_name: promotion_label(promotion, multiplier),
        transaction,
    })
}

/// Registers a new client and immediately records their first purchase.
///
/// This is the follow-up to a `ClientNotFound` from [`register_purchase`]. Registration
/// and purchase share one database transaction: if the purchase fails, the client is
/// not registered either.
///
/// # Errors
/// Returns any error from client registration or from the purchase itself.
#[allow(clippy::too_many_arguments)] // Registration fields plus the purchase itself
pub async fn register_purchase_for_new_client(
    db: &DatabaseConnection,
    rules: &LoyaltyRules,
    cpf: &str,
    name: String,
    phone: String,
    amount: f64,
    promotion: Option<&promotion::Model>,
    now: DateTime<Utc>,
) -> Result<PurchaseReceipt> {
    validate_amount(amount)?;
    let multiplier = effective_multiplier(promotion, now);

    let txn = db.begin().await?;
    let created = client::create_client(&txn, name, cpf, phone).await?;
    let (updated, outcome, transaction) =
        accrue(&txn, rules, &created.code, amount, multiplier, now).await?;
    txn.commit().await?;

    info!(
        client_id = updated.id,
        points_generated = outcome.points_generated,
        multiplier,
        "Client registered with first purchase"
    );

    Ok(PurchaseReceipt {
        client: updated,
        outcome,
        promotion_name: promotion_label(promotion, multiplier),
        transaction,
    })
}
