//! Withdrawal Discord command - redeems bonus and prints the receipt.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{report::format_currency, withdrawal as withdrawal_core},
        errors::{Error, Result},
    };
    use chrono::Utc;

    /// Withdraws bonus credit from a client and prints a receipt for signature.
    #[poise::command(slash_command)]
    pub async fn withdraw(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client CPF (11 digits) or 4-digit code"] identifier: String,
        #[description = "Bonus to withdraw, in reais"] amount: f64,
    ) -> Result<()> {
        let data = ctx.data();

        let receipt = withdrawal_core::withdraw_bonus(
            &data.database,
            &data.rules,
            &identifier,
            amount,
            Utc::now(),
        )
        .await?;

        let printable = receipt.render(&data.config.store.name, data.offset)?;
        ctx.say(format!(
            "✅ Withdrew {} from **{}** ({} points removed)\n```\n{printable}\n```",
            format_currency(receipt.amount),
            receipt.client_name,
            receipt.outcome.points_removed,
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
