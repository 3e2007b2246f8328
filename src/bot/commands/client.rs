//! Client Discord commands - lookup, listing and registration.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::fit_lines},
        core::{
            client as client_core,
            report::{format_currency, format_points_change},
            transaction,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Number of ledger entries shown on the client card
    const RECENT_ENTRIES: usize = 5;

    /// Shows a client's balances, contact details and latest activity.
    #[poise::command(slash_command)]
    pub async fn client(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client CPF (11 digits) or 4-digit code"] identifier: String,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let found = client_core::require_client(db, &identifier).await?;
        let entries = transaction::transactions_for_client(db, found.id).await?;

        let milestone = data.rules.points_per_milestone();
        let to_next = milestone - found.points.rem_euclid(milestone);

        let mut response = format!("👤 **{}** (code **{}**)\n", found.name, found.code);
        writeln!(&mut response, "CPF: {}", client_core::format_cpf(&found.cpf))?;
        writeln!(&mut response, "Phone: {}", client_core::format_phone(&found.phone))?;
        writeln!(&mut response, "⭐ Points: {}", found.points)?;
        writeln!(&mut response, "💰 Bonus: {}", format_currency(found.bonus))?;
        writeln!(&mut response, "🎯 {to_next} points to the next bonus")?;
        writeln!(&mut response)?;

        if entries.is_empty() {
            response.push_str("_No purchases or withdrawals yet_\n");
        } else {
            response.push_str("**Recent activity:**\n");
            for entry in entries.iter().take(RECENT_ENTRIES) {
                writeln!(
                    &mut response,
                    "• {} {} {} ({} pts)",
                    entry.created_at.with_timezone(&data.offset).format("%d/%m/%Y %H:%M"),
                    entry.kind.label(),
                    format_currency(entry.amount),
                    format_points_change(entry.points_generated),
                )?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists clients ordered by points, optionally filtered by name, CPF or code.
    #[poise::command(slash_command)]
    pub async fn clients(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of the name, CPF or code"] search: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let found = client_core::list_clients(db, search.as_deref()).await?;

        if found.is_empty() {
            ctx.say("👥 No clients found.").await?;
            return Ok(());
        }

        let lines: Vec<String> = found
            .iter()
            .map(|c| {
                format!(
                    "`{}` **{}** - {} pts, {}",
                    c.code,
                    c.name,
                    c.points,
                    format_currency(c.bonus)
                )
            })
            .collect();
        let header = format!("👥 **Clients ({})**\n\n", found.len());
        ctx.say(fit_lines(&header, &lines)).await?;
        Ok(())
    }

    /// Registers a client without a purchase.
    #[poise::command(slash_command)]
    pub async fn register_client(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Full name"] name: String,
        #[description = "CPF, with or without punctuation"] cpf: String,
        #[description = "Phone number"] phone: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let created = client_core::create_client(db, name, &cpf, phone).await?;

        ctx.say(format!(
            "✅ Registered **{}**. Client code: **{}**",
            created.name, created.code
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
