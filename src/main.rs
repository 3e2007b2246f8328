use dotenvy::dotenv;
use pontos_plus::{
    bot,
    config::{database, store, users},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Store and loyalty settings
    let config = store::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let offset = config.utc_offset()?;
    let rules = config.loyalty_rules()?;
    info!(
        store = %config.store.name,
        points_per_milestone = rules.points_per_milestone(),
        "Configuration loaded"
    );

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Staff allowlist
    let staff_ids = users::get_staff_ids();
    if staff_ids.is_empty() {
        warn!("STAFF_USER_IDS is empty, every user in the guild can operate the bot");
    } else {
        info!(count = staff_ids.len(), "Staff allowlist loaded");
    }

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    let data = bot::BotData::new(db, config, rules, offset, staff_ids);
    bot::run_bot(&token, data).await
}
