//! Staff allowlist loaded from environment variables.
//!
//! `STAFF_USER_IDS` holds a comma-separated list of Discord user IDs allowed to run
//! commands. An empty or missing list leaves the bot open to everyone in the guild.

use std::collections::HashSet;

/// Parses a comma-separated list of user IDs, ignoring blanks and surrounding spaces.
#[must_use]
pub fn parse_staff_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads the staff allowlist from `STAFF_USER_IDS`.
#[must_use]
pub fn get_staff_ids() -> HashSet<String> {
    std::env::var("STAFF_USER_IDS")
        .map(|raw| parse_staff_ids(&raw))
        .unwrap_or_default()
}

/// Whether `user_id` may operate the bot under the given allowlist.
#[must_use]
pub fn is_staff(staff_ids: &HashSet<String>, user_id: &str) -> bool {
    staff_ids.is_empty() || staff_ids.contains(user_id)
}
