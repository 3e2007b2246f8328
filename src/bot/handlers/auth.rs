//! Staff check run by poise before every command.

use crate::{
    bot::BotData,
    config::users,
    errors::{Error, Result},
};
use tracing::warn;

/// Allows the command when the author is on the staff allowlist, or when the
/// allowlist is empty.
pub async fn staff_check(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    let author_id = ctx.author().id.to_string();
    let allowed = users::is_staff(&ctx.data().staff_ids, &author_id);
    if !allowed {
        warn!(
            user_id = %author_id,
            command = %ctx.command().name,
            "Command refused for non-staff user"
        );
    }
    Ok(allowed)
}
