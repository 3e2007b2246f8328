//! Report Discord commands - dashboard, history and the daily withdrawal report.
//!
//! These are on-demand views: each invocation reads the current state of the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::fit_lines},
        core::{
            report::{self, format_currency},
            transaction::{self, DEFAULT_HISTORY_LIMIT},
        },
        errors::{Error, Result},
    };
    use chrono::{NaiveDate, Utc};
    use poise::serenity_prelude as serenity;

    /// Shows store-wide totals: clients, points, outstanding bonus and active promotions.
    #[poise::command(slash_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let now = Utc::now();
        let stats = report::dashboard_stats(&data.database, now).await?;

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 {}", data.config.store.name))
            .description(format!(
                "As of {}",
                now.with_timezone(&data.offset).format("%d/%m/%Y %H:%M")
            ))
            .color(0x0034_98DB)
            .field("👥 Clients", stats.total_clients.to_string(), true)
            .field("⭐ Points", stats.total_points.to_string(), true)
            .field("💰 Bonus outstanding", format_currency(stats.total_bonus), true)
            .field("🏷️ Active promotions", stats.active_promotions.to_string(), true);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the latest purchases and withdrawals across all clients.
    #[poise::command(slash_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many entries to show (default 50)"]
        #[min = 1]
        #[max = 200]
        limit: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();
        let entries = transaction::recent_transactions(
            &data.database,
            limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        )
        .await?;

        if entries.is_empty() {
            ctx.say("📜 No purchases or withdrawals recorded yet.").await?;
            return Ok(());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| format!("• {}", report::format_ledger_entry(entry, data.offset)))
            .collect();
        ctx.say(fit_lines("📜 **Latest activity**\n\n", &lines))
            .await?;
        Ok(())
    }

    /// Lists the bonus withdrawals of a day and attaches them as CSV.
    #[poise::command(slash_command)]
    pub async fn daily_withdrawals(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day to report, YYYY-MM-DD (default today)"] date: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let day = match date.as_deref() {
            Some(input) => NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
                Error::InvalidDate {
                    input: input.to_string(),
                }
            })?,
            None => report::local_today(Utc::now(), data.offset),
        };

        ctx.defer().await?;

        let daily = report::daily_withdrawal_report(&data.database, day, data.offset).await?;
        let text = daily.render_text(&data.config.store.name)?;
        let attachment = serenity::CreateAttachment::bytes(daily.to_csv()?, daily.csv_filename());

        let content = if daily.rows.is_empty() {
            format!("📄 No withdrawals on {}.", day.format("%d/%m/%Y"))
        } else {
            format!(
                "📄 {} withdrawal(s) on {}, total {}\n```\n{text}\n```",
                daily.rows.len(),
                day.format("%d/%m/%Y"),
                format_currency(daily.total)
            )
        };
        let content = if content.chars().count() > 1_900 {
            format!(
                "📄 {} withdrawal(s) on {}, total {}. Full list in the attachment.",
                daily.rows.len(),
                day.format("%d/%m/%Y"),
                format_currency(daily.total)
            )
        } else {
            content
        };

        ctx.send(
            poise::CreateReply::default()
                .content(content)
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
