//! Promotion Discord commands - `/promotion add|list|toggle|delete`.
//!
//! Dates are typed as `YYYY-MM-DD` in the store's local time. The start date covers
//! the whole first day and the end date the whole last day.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::fit_lines, handlers::autocomplete},
        core::promotion as promotion_core,
        entities::promotion as promotion_entity,
        errors::{Error, Result},
    };
    use chrono::{FixedOffset, Utc};
    use sea_orm::DatabaseConnection;
    use tracing::instrument;

    fn describe_window(promo: &promotion_entity::Model, offset: FixedOffset) -> String {
        let day = |at: chrono::DateTime<Utc>| at.with_timezone(&offset).format("%d/%m/%Y").to_string();
        match (promo.starts_at, promo.ends_at) {
            (None, None) => "no end date".to_string(),
            (Some(start), None) => format!("from {}", day(start)),
            (None, Some(end)) => format!("until {}", day(end)),
            (Some(start), Some(end)) => format!("{} to {}", day(start), day(end)),
        }
    }

    async fn require_by_name(
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<promotion_entity::Model> {
        promotion_core::get_promotion_by_name(db, name)
            .await?
            .ok_or_else(|| Error::PromotionNotFound {
                name: name.to_string(),
            })
    }

    /// Parent command for managing multiplier promotions.
    #[poise::command(
        slash_command,
        subcommands("promotion_add", "promotion_list", "promotion_toggle", "promotion_delete")
    )]
    pub async fn promotion(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Promotion management. Available subcommands:\n\
            `/promotion add name:<name> multiplier:<n> [start:YYYY-MM-DD] [end:YYYY-MM-DD]`\n\
            `/promotion list`\n\
            `/promotion toggle name:<name>`\n\
            `/promotion delete name:<name>`";
        ctx.send(
            poise::CreateReply::default()
                .content(help_text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Creates a promotion. New promotions start active.
    #[poise::command(slash_command, rename = "add")]
    #[instrument(skip(ctx))]
    pub async fn promotion_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion name"] name: String,
        #[description = "Points multiplier (e.g. 2 for double points)"]
        #[min = 1]
        multiplier: i32,
        #[description = "First day, YYYY-MM-DD"] start: Option<String>,
        #[description = "Last day, YYYY-MM-DD"] end: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let starts_at = start
            .as_deref()
            .map(|input| promotion_core::parse_start_date(input, data.offset))
            .transpose()?;
        let ends_at = end
            .as_deref()
            .map(|input| promotion_core::parse_end_date(input, data.offset))
            .transpose()?;

        let created =
            promotion_core::create_promotion(&data.database, name, multiplier, starts_at, ends_at)
                .await?;

        ctx.say(format!(
            "✅ Created promotion **{}** ({}x, {})",
            created.name,
            created.multiplier,
            describe_window(&created, data.offset)
        ))
        .await?;
        Ok(())
    }

    /// Lists every promotion, marking expired ones as inactive.
    #[poise::command(slash_command, rename = "list")]
    pub async fn promotion_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let promotions = promotion_core::list_all_promotions(&data.database).await?;

        if promotions.is_empty() {
            ctx.say("🏷️ No promotions yet. Create one with `/promotion add`.")
                .await?;
            return Ok(());
        }

        let now = Utc::now();
        let lines: Vec<String> = promotions
            .iter()
            .map(|promo| {
                let status = if promotion_core::is_effectively_active(promo, now) {
                    "🟢"
                } else {
                    "⚪"
                };
                format!(
                    "{status} **{}** - {}x ({})",
                    promo.name,
                    promo.multiplier,
                    describe_window(promo, data.offset)
                )
            })
            .collect();

        ctx.say(fit_lines("🏷️ **Promotions**\n\n", &lines)).await?;
        Ok(())
    }

    /// Switches a promotion on or off.
    #[poise::command(slash_command, rename = "toggle")]
    #[instrument(skip(ctx))]
    pub async fn promotion_toggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion name"]
        #[autocomplete = "autocomplete::autocomplete_any_promotion"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let existing = require_by_name(db, &name).await?;
        let updated = promotion_core::toggle_promotion(db, existing.id).await?;

        let state = if updated.active { "enabled" } else { "disabled" };
        ctx.say(format!("✅ Promotion **{}** {state}.", updated.name))
            .await?;
        Ok(())
    }

    /// Deletes a promotion permanently. Past purchases keep their multiplier.
    #[poise::command(slash_command, rename = "delete")]
    #[instrument(skip(ctx))]
    pub async fn promotion_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Promotion name"]
        #[autocomplete = "autocomplete::autocomplete_any_promotion"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let existing = require_by_name(db, &name).await?;
        promotion_core::delete_promotion(db, existing.id).await?;

        ctx.say(format!("🗑️ Deleted promotion **{}**.", existing.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
