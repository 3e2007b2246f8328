//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for Pontos+, including all slash
//! commands, autocomplete handlers, the staff check and bot context management.

/// Discord command implementations (purchase, withdrawal, client, promotion, report, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, staff check)
pub mod handlers;

use crate::{
    config::store::Config,
    core::loyalty::LoyaltyRules,
    errors::{Error, Result},
};
use chrono::FixedOffset;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the settings every command
/// needs: loyalty rules, store identity, local time offset and the staff allowlist.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Store settings from config.toml
    pub config: Config,
    /// Validated milestone rules
    pub rules: LoyaltyRules,
    /// Store local time
    pub offset: FixedOffset,
    /// Discord user IDs allowed to run commands; empty allows everyone
    pub staff_ids: HashSet<String>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        config: Config,
        rules: LoyaltyRules,
        offset: FixedOffset,
        staff_ids: HashSet<String>,
    ) -> Self {
        Self {
            database,
            config,
            rules,
            offset,
            staff_ids,
        }
    }
}

async fn reply_ephemeral(ctx: poise::Context<'_, BotData, Error>, text: String) {
    let reply = poise::CreateReply::default().content(text).ephemeral(true);
    if let Err(e) = ctx.send(reply).await {
        error!("Failed to send error message: {}", e);
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_user_error() {
                warn!(command = %ctx.command().name, "Rejected: {}", error);
                reply_ephemeral(ctx, format!("❌ {error}")).await;
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                reply_ephemeral(ctx, format!("⚠️ An error occurred: {error}")).await;
            }
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                error!("Staff check failed: {:?}", error);
            }
            reply_ephemeral(ctx, "⛔ This command is restricted to store staff.".to_string())
                .await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// Commands are registered globally once the bot is ready.
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::purchase(),
                commands::withdraw(),
                commands::client(),
                commands::clients(),
                commands::register_client(),
                commands::promotion(),
                commands::dashboard(),
                commands::history(),
                commands::daily_withdrawals(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(handlers::auth::staff_check(ctx))),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Slash commands registered globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client.start().await.map_err(Error::from)
}

pub use commands::*;
pub use handlers::*;
