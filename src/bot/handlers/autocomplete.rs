//! Autocomplete handlers for Discord slash command parameters.
//!
//! Purchases only offer promotions that can be applied right now. Management
//! commands offer every stored promotion, including expired and disabled ones.

use crate::{bot::BotData, core::promotion, errors::Error};
use chrono::Utc;

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

fn matching_names(names: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();
    matching.sort();
    matching.dedup();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Suggests promotions that are valid at this moment.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_valid_promotion(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(promotions) = promotion::list_valid_promotions(db, Utc::now()).await else {
        return Vec::new();
    };
    matching_names(promotions.into_iter().map(|p| p.name), partial)
}

/// Suggests every stored promotion.
pub async fn autocomplete_any_promotion(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let Ok(promotions) = promotion::list_all_promotions(db).await else {
        return Vec::new();
    };
    matching_names(promotions.into_iter().map(|p| p.name), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_names_filters_case_insensitively() {
        let names = vec![
            "Natal 2x".to_string(),
            "Black Friday".to_string(),
            "natal relâmpago".to_string(),
        ];
        assert_eq!(
            matching_names(names, "NATAL"),
            vec!["Natal 2x".to_string(), "natal relâmpago".to_string()]
        );
    }

    #[test]
    fn test_matching_names_respects_discord_limit() {
        let names = (0..40).map(|i| format!("Promo {i:02}"));
        let matching = matching_names(names, "");
        assert_eq!(matching.len(), MAX_SUGGESTIONS);
        assert_eq!(matching[0], "Promo 00");
    }

    #[test]
    fn test_matching_names_drops_duplicates() {
        let names = vec!["Dobro".to_string(), "Dobro".to_string()];
        assert_eq!(matching_names(names, "do"), vec!["Dobro".to_string()]);
    }
}
