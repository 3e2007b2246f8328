//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let rules = &ctx.data().rules;
        let help_text = format!(
            "**Pontos+ Help**\n\
            Every R$ 1.00 spent earns 1 point (times the promotion multiplier). \
            Every {} points are worth R$ {:.2} of bonus.\n\n\
            **Counter**\n\
            • `/purchase <cpf or code> <amount> [promotion] [name] [phone]` - Registers a purchase. \
            Unknown CPFs are registered on the spot when name and phone are given.\n\
            • `/withdraw <cpf or code> <amount>` - Withdraws bonus and prints a receipt.\n\
            • `/client <cpf or code>` - Shows a client's balance and latest activity.\n\n\
            **Management**\n\
            • `/register_client <name> <cpf> <phone>` - Registers a client without a purchase.\n\
            • `/clients [search]` - Lists clients by points.\n\
            • `/promotion add|list|toggle|delete` - Manages multiplier promotions.\n\n\
            **Reports**\n\
            • `/dashboard` - Store totals.\n\
            • `/history [limit]` - Latest purchases and withdrawals.\n\
            • `/daily_withdrawals [date]` - Withdrawals of a day, with CSV export.\n\n\
            **Utility**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.",
            rules.points_per_milestone(),
            rules.bonus_per_milestone(),
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
