//! Withdrawal flow - Redeems bonus credit and prints a receipt.
//!
//! A withdrawal larger than the client's bonus is rejected before anything is
//! written. Otherwise the bonus and the points it was worth are debited and a
//! withdrawal entry (negative points, multiplier 1) is appended to the ledger.

use crate::{
    core::{
        client,
        loyalty::{Balance, LoyaltyRules, WithdrawalOutcome, validate_amount},
        report::format_currency,
        transaction::{NewTransaction, record_transaction},
    },
    entities::{TransactionKind, transaction},
    errors::Result,
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::fmt::Write;
use tracing::{info, instrument};

/// Width of the thermal printer paper, in characters
pub const RECEIPT_WIDTH: usize = 32;

/// Printable record of a bonus withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawalReceipt {
    /// Client name
    pub client_name: String,
    /// CPF or code exactly as staff typed it
    pub identifier: String,
    /// Bonus withdrawn, in reais
    pub amount: f64,
    /// Bonus left after the withdrawal
    pub remaining_bonus: f64,
    /// Points left after the withdrawal
    pub remaining_points: i64,
    /// When the withdrawal happened
    pub timestamp: DateTime<Utc>,
    /// Points and bonus computation
    pub outcome: WithdrawalOutcome,
    /// The ledger entry that was appended
    pub transaction: transaction::Model,
}

fn centered(text: &str) -> String {
    format!("{text:^width$}", width = RECEIPT_WIDTH)
}

/// Splits `label` + `value` into lines of at most `RECEIPT_WIDTH` characters.
fn wrapped(label: &str, value: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().chain(value.chars()).collect();
    chars
        .chunks(RECEIPT_WIDTH)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn label_value(label: &str, value: &str) -> String {
    let width = RECEIPT_WIDTH.saturating_sub(label.chars().count());
    format!("{label}{value:>width$}")
}

impl WithdrawalReceipt {
    /// Renders the receipt for a 32-column thermal printer, with the timestamp in
    /// the store's local time.
    pub fn render(&self, store_name: &str, offset: FixedOffset) -> Result<String> {
        let rule = "=".repeat(RECEIPT_WIDTH);
        let thin_rule = "-".repeat(RECEIPT_WIDTH);
        let local_time = self.timestamp.with_timezone(&offset);

        let mut text = String::new();
        writeln!(&mut text, "{rule}")?;
        for line in wrapped("", store_name) {
            writeln!(&mut text, "{}", centered(&line).trim_end())?;
        }
        writeln!(&mut text, "{}", centered("COMPROVANTE DE RETIRADA").trim_end())?;
        writeln!(&mut text, "{rule}")?;
        for line in wrapped("Cliente: ", &self.client_name)
            .into_iter()
            .chain(wrapped("CPF/Codigo: ", &self.identifier))
        {
            writeln!(&mut text, "{line}")?;
        }
        writeln!(&mut text, "Data: {}", local_time.format("%d/%m/%Y %H:%M"))?;
        writeln!(&mut text, "{thin_rule}")?;
        writeln!(
            &mut text,
            "{}",
            label_value("Valor retirado:", &format_currency(self.amount))
        )?;
        writeln!(
            &mut text,
            "{}",
            label_value("Saldo restante:", &format_currency(self.remaining_bonus))
        )?;
        writeln!(
            &mut text,
            "{}",
            label_value("Pontos restantes:", &self.remaining_points.to_string())
        )?;
        writeln!(&mut text, "{rule}")?;
        writeln!(&mut text)?;
        writeln!(&mut text, "{}", "_".repeat(RECEIPT_WIDTH))?;
        write!(&mut text, "{}", centered("Assinatura do cliente").trim_end())?;
        Ok(text)
    }
}

/// Withdraws `amount` reais of bonus from the client identified by `identifier`.
///
/// # Errors
/// Returns an error if:
/// - The amount is not a positive, finite, whole number of cents
/// - No client matches the identifier (`Error::ClientNotFound`)
/// - The amount exceeds the client's bonus (`Error::InsufficientBonus`); nothing is written
/// - The client's balance changed concurrently (`Error::ConcurrentUpdate`)
/// - The database operation fails
#[instrument(skip(db, rules))]
pub async fn withdraw_bonus(
    db: &DatabaseConnection,
    rules: &LoyaltyRules,
    identifier: &str,
    amount: f64,
    now: DateTime<Utc>,
) -> Result<WithdrawalReceipt> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    let current = client::require_client(&txn, identifier).await?;
    let outcome = rules.apply_withdrawal(
        Balance {
            points: current.points,
            bonus: current.bonus,
        },
        amount,
    )?;

    let updated =
        client::update_balances(&txn, &current, outcome.new_points, outcome.new_bonus).await?;

    let transaction = record_transaction(
        &txn,
        NewTransaction {
            client_id: current.id,
            amount,
            points_generated: -outcome.points_removed,
            multiplier: 1,
            kind: TransactionKind::Withdrawal,
            created_at: now,
        },
    )
    .await?;

    txn.commit().await?;

    info!(
        client_id = updated.id,
        amount,
        remaining_bonus = updated.bonus,
        "Bonus withdrawn"
    );

    Ok(WithdrawalReceipt {
        client_name: updated.name,
        identifier: identifier.trim().to_string(),
        amount,
        remaining_bonus: updated.bonus,
        remaining_points: updated.points,
        timestamp: now,
        outcome,
        transaction,
    })
}
