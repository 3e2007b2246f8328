//! Report generation business logic.
//!
//! This module provides the dashboard aggregates, the daily withdrawal report with its
//! CSV export, and the formatting helpers shared by receipts and history views. All
//! functions are framework-agnostic and return structured data that the bot layer formats.

use crate::{
    core::{
        loyalty::{from_cents, to_cents},
        promotion::is_effectively_active,
        transaction::{LedgerEntry, transactions_between},
    },
    entities::{Client, Promotion, TransactionKind},
    errors::{Error, Result},
};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::fmt::Write;

/// Store-wide totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Number of registered clients
    pub total_clients: u64,
    /// Sum of all client points
    pub total_points: i64,
    /// Sum of all outstanding bonus credit, in reais
    pub total_bonus: f64,
    /// Promotions whose stored flag is on and whose end date has not passed
    pub active_promotions: u64,
}

/// One line of the daily withdrawal report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalRow {
    /// Local time of the withdrawal, `HH:MM:SS`
    #[serde(rename = "Hora")]
    pub time: String,
    /// Client name
    #[serde(rename = "Cliente")]
    pub client_name: String,
    /// Client code
    #[serde(rename = "Codigo")]
    pub client_code: String,
    /// Bonus withdrawn, in reais
    #[serde(rename = "Valor", serialize_with = "two_decimals")]
    pub amount: f64,
}

fn two_decimals<S>(amount: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{amount:.2}"))
}

/// All bonus withdrawals of one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWithdrawalReport {
    /// The local day covered
    pub date: NaiveDate,
    /// Withdrawals in chronological order
    pub rows: Vec<WithdrawalRow>,
    /// Sum of all withdrawn amounts
    pub total: f64,
}

/// Formats an amount in reais, e.g. `R$ 10.00` or `-R$ 5.50`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-R$ {:.2}", amount.abs())
    } else {
        format!("R$ {amount:.2}")
    }
}

/// Formats a points delta with an explicit sign, e.g. `+120` or `-500`.
#[must_use]
pub fn format_points_change(points: i64) -> String {
    if points >= 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}

/// Generates a one-line summary of a ledger entry for the history view.
#[must_use]
pub fn format_ledger_entry(entry: &LedgerEntry, offset: FixedOffset) -> String {
    let tx = &entry.transaction;
    let when = tx.created_at.with_timezone(&offset).format("%d/%m/%Y %H:%M");
    let multiplier = if tx.multiplier > 1 {
        format!(" ({}x)", tx.multiplier)
    } else {
        String::new()
    };
    format!(
        "{when} | {} ({}) | {} | {} | {} pts{multiplier}",
        entry.client_name,
        entry.client_code,
        tx.kind.label(),
        format_currency(tx.amount),
        format_points_change(tx.points_generated),
    )
}

/// UTC instants bounding a local calendar day: `[start of day, start of next day)`.
///
/// # Errors
/// Returns `Error::InvalidDate` for days at the edge of the representable range.
pub fn local_day_bounds(
    day: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || Error::InvalidDate {
        input: day.to_string(),
    };
    let next_day = day.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
    let start = offset
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .single()
        .ok_or_else(invalid)?;
    let end = offset
        .from_local_datetime(&next_day.and_time(NaiveTime::MIN))
        .single()
        .ok_or_else(invalid)?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Today's date in the store's local time.
#[must_use]
pub fn local_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Computes the dashboard totals with full table scans.
pub async fn dashboard_stats(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<DashboardStats> {
    let clients = Client::find().all(db).await?;
    let promotions = Promotion::find().all(db).await?;

    let total_points = clients.iter().map(|c| c.points).sum();
    let total_bonus_cents: i64 = clients.iter().map(|c| to_cents(c.bonus)).sum();
    let active_promotions = promotions
        .iter()
        .filter(|p| is_effectively_active(p, now))
        .count();

    Ok(DashboardStats {
        total_clients: u64::try_from(clients.len()).unwrap_or(u64::MAX),
        total_points,
        total_bonus: from_cents(total_bonus_cents),
        active_promotions: u64::try_from(active_promotions).unwrap_or(u64::MAX),
    })
}

/// Collects every withdrawal recorded on `day` in the store's local time.
pub async fn daily_withdrawal_report(
    db: &DatabaseConnection,
    day: NaiveDate,
    offset: FixedOffset,
) -> Result<DailyWithdrawalReport> {
    let (start, end) = local_day_bounds(day, offset)?;
    let entries = transactions_between(db, TransactionKind::Withdrawal, start, end).await?;

    let total_cents: i64 = entries
        .iter()
        .map(|entry| to_cents(entry.transaction.amount))
        .sum();
    let rows = entries
        .into_iter()
        .map(|entry| WithdrawalRow {
            time: entry
                .transaction
                .created_at
                .with_timezone(&offset)
                .format("%H:%M:%S")
                .to_string(),
            client_name: entry.client_name,
            client_code: entry.client_code,
            amount: entry.transaction.amount,
        })
        .collect();

    Ok(DailyWithdrawalReport {
        date: day,
        rows,
        total: from_cents(total_cents),
    })
}

impl DailyWithdrawalReport {
    /// File name for the export, e.g. `saidas-01-02-2024.csv`.
    #[must_use]
    pub fn csv_filename(&self) -> String {
        format!("saidas-{}.csv", self.date.format("%d-%m-%Y"))
    }

    /// Exports the report as CSV: a header, one line per withdrawal, and a TOTAL line.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        if self.rows.is_empty() {
            writer.write_record(["Hora", "Cliente", "Codigo", "Valor"])?;
        }
        writer.write_record(["", "", "TOTAL", &format!("{:.2}", self.total)])?;
        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    /// Plain-text table for chat, with times, clients, codes and amounts.
    pub fn render_text(&self, store_name: &str) -> Result<String> {
        let mut text = String::new();
        writeln!(&mut text, "{store_name}")?;
        writeln!(
            &mut text,
            "Relatório de Saídas do Dia - {}",
            self.date.format("%d/%m/%Y")
        )?;
        writeln!(&mut text)?;
        writeln!(
            &mut text,
            "{:<8}  {:<20}  {:<6}  {:>11}",
            "Hora", "Cliente", "Código", "Valor"
        )?;
        for row in &self.rows {
            let name: String = row.client_name.chars().take(20).collect();
            writeln!(
                &mut text,
                "{:<8}  {:<20}  {:<6}  {:>11}",
                row.time,
                name,
                row.client_code,
                format_currency(row.amount)
            )?;
        }
        write!(
            &mut text,
            "{:<8}  {:<20}  {:<6}  {:>11}",
            "",
            "",
            "TOTAL:",
            format_currency(self.total)
        )?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        client, promotion,
        transaction::{NewTransaction, record_transaction},
    };
    use crate::test_utils::*;
    use chrono::Duration;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(date: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc)
    }

    fn withdrawal(client_id: i64, amount: f64, created_at: DateTime<Utc>) -> NewTransaction {
        NewTransaction {
            client_id,
            amount,
            points_generated: -(amount * 50.0) as i64,
            multiplier: 1,
            kind: TransactionKind::Withdrawal,
            created_at,
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(10.0), "R$ 10.00");
        assert_eq!(format_currency(123.456), "R$ 123.46");
        assert_eq!(format_currency(-5.5), "-R$ 5.50");
        assert_eq!(format_currency(0.0), "R$ 0.00");
    }

    #[test]
    fn test_format_points_change() {
        assert_eq!(format_points_change(120), "+120");
        assert_eq!(format_points_change(0), "+0");
        assert_eq!(format_points_change(-500), "-500");
    }

    #[test]
    fn test_local_day_bounds_shift_by_offset() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let (start, end) = local_day_bounds(day, brt()).unwrap();
        assert_eq!(start, at("2024-02-01T03:00:00Z"));
        assert_eq!(end, at("2024-02-02T03:00:00Z"));
    }

    #[test]
    fn test_local_today_crosses_midnight() {
        // 01:30 UTC is still the previous evening in Natal
        let now = at("2024-02-02T01:30:00Z");
        assert_eq!(
            local_today(now, brt()),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_dashboard_stats_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let stats = dashboard_stats(&db, Utc::now()).await?;
        assert_eq!(
            stats,
            DashboardStats {
                total_clients: 0,
                total_points: 0,
                total_bonus: 0.0,
                active_promotions: 0,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_stats_aggregates() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let first = create_test_client(&db, "11111111111").await?;
        let second = create_test_client(&db, "22222222222").await?;
        client::update_balances(&db, &first, 530, 10.0).await?;
        client::update_balances(&db, &second, 1_200, 20.0).await?;

        promotion::create_promotion(&db, "Aberta".to_string(), 2, None, None).await?;
        promotion::create_promotion(
            &db,
            "Vencida".to_string(),
            3,
            None,
            Some(now - Duration::days(1)),
        )
        .await?;

        let stats = dashboard_stats(&db, now).await?;
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.total_points, 1_730);
        assert_eq!(stats.total_bonus, 30.0);
        assert_eq!(stats.active_promotions, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_withdrawal_report_uses_local_day() -> Result<()> {
        let (db, client) = setup_with_client().await?;
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        // 09:00 and 23:30 local on Feb 1st
        record_transaction(&db, withdrawal(client.id, 10.0, at("2024-02-01T12:00:00Z"))).await?;
        record_transaction(&db, withdrawal(client.id, 5.5, at("2024-02-02T02:30:00Z"))).await?;
        // 23:30 local on Jan 31st, 00:30 local on Feb 2nd
        record_transaction(&db, withdrawal(client.id, 7.0, at("2024-02-01T02:30:00Z"))).await?;
        record_transaction(&db, withdrawal(client.id, 8.0, at("2024-02-02T03:30:00Z"))).await?;
        // A purchase on the same day is not a withdrawal
        record_transaction(
            &db,
            NewTransaction {
                kind: TransactionKind::Purchase,
                points_generated: 100,
                ..withdrawal(client.id, 100.0, at("2024-02-01T13:00:00Z"))
            },
        )
        .await?;

        let report = daily_withdrawal_report(&db, day, brt()).await?;
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].time, "09:00:00");
        assert_eq!(report.rows[1].time, "23:30:00");
        assert_eq!(report.rows[0].client_code, client.code);
        assert_eq!(report.total, 15.5);
        Ok(())
    }

    #[test]
    fn test_report_csv_export() {
        let report = DailyWithdrawalReport {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            rows: vec![WithdrawalRow {
                time: "09:00:00".to_string(),
                client_name: "Maria".to_string(),
                client_code: "0042".to_string(),
                amount: 10.0,
            }],
            total: 10.0,
        };

        let csv = String::from_utf8(report.to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Hora,Cliente,Codigo,Valor");
        assert_eq!(lines[1], "09:00:00,Maria,0042,10.00");
        assert_eq!(lines[2], ",,TOTAL,10.00");
        assert_eq!(report.csv_filename(), "saidas-01-02-2024.csv");
    }

    #[test]
    fn test_report_csv_rows_match_total_format() {
        let row = |time: &str, amount: f64| WithdrawalRow {
            time: time.to_string(),
            client_name: "Maria".to_string(),
            client_code: "0042".to_string(),
            amount,
        };
        let report = DailyWithdrawalReport {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            rows: vec![row("09:00:00", 12.5), row("10:00:00", 0.1)],
            total: 12.6,
        };

        let csv = String::from_utf8(report.to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "09:00:00,Maria,0042,12.50");
        assert_eq!(lines[2], "10:00:00,Maria,0042,0.10");
        assert_eq!(lines[3], ",,TOTAL,12.60");
    }

    #[test]
    fn test_report_csv_export_empty_day_keeps_header() {
        let report = DailyWithdrawalReport {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            rows: Vec::new(),
            total: 0.0,
        };

        let csv = String::from_utf8(report.to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["Hora,Cliente,Codigo,Valor", ",,TOTAL,0.00"]);
    }

    #[test]
    fn test_report_render_text_has_total() {
        let report = DailyWithdrawalReport {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            rows: vec![WithdrawalRow {
                time: "09:00:00".to_string(),
                client_name: "Maria".to_string(),
                client_code: "0042".to_string(),
                amount: 10.0,
            }],
            total: 10.0,
        };

        let text = report.render_text("FERRAGENS NATAL").unwrap();
        assert!(text.starts_with("FERRAGENS NATAL"));
        assert!(text.contains("01/02/2024"));
        assert!(text.contains("Maria"));
        assert!(text.lines().last().unwrap().contains("TOTAL:"));
        assert!(text.lines().last().unwrap().contains("R$ 10.00"));
    }
}
