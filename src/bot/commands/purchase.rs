//! Purchase Discord command.
//!
//! Staff type the client's CPF or code and the purchase amount. When the CPF is not
//! registered yet, the same command registers the client if a name and phone are
//! supplied; otherwise staff are asked to run it again with them.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{promotion as promotion_core, purchase as purchase_core},
        errors::{Error, Result},
    };
    use chrono::Utc;

    /// Registers a purchase and accrues points for the client.
    #[poise::command(slash_command)]
    pub async fn purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client CPF (11 digits) or 4-digit code"] identifier: String,
        #[description = "Purchase amount in reais"] amount: f64,
        #[description = "Promotion to apply"]
        #[autocomplete = "autocomplete::autocomplete_valid_promotion"]
        promotion_name: Option<String>,
        #[description = "Name, to register a new client"] name: Option<String>,
        #[description = "Phone, to register a new client"] phone: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let now = Utc::now();

        let selected = match promotion_name.as_deref() {
            Some(promo_name) => Some(
                promotion_core::get_promotion_by_name(db, promo_name)
                    .await?
                    .ok_or_else(|| Error::PromotionNotFound {
                        name: promo_name.to_string(),
                    })?,
            ),
            None => None,
        };

        let result =
            purchase_core::register_purchase(db, &data.rules, &identifier, amount, selected.as_ref(), now)
                .await;

        let (receipt, registered) = match result {
            Ok(receipt) => (receipt, false),
            Err(Error::ClientNotFound { identifier: missing }) => {
                let (Some(name), Some(phone)) = (name, phone) else {
                    ctx.say(format!(
                        "❓ No client found for `{missing}`. Run `/purchase` again with \
                        the client's `name` and `phone` to register them with this purchase."
                    ))
                    .await?;
                    return Ok(());
                };
                let receipt = purchase_core::register_purchase_for_new_client(
                    db,
                    &data.rules,
                    &identifier,
                    name,
                    phone,
                    amount,
                    selected.as_ref(),
                    now,
                )
                .await?;
                (receipt, true)
            }
            Err(e) => return Err(e),
        };

        let heading = if registered {
            format!("✅ **{}** registered and purchase recorded", receipt.client.name)
        } else {
            format!("✅ Purchase recorded for **{}**", receipt.client.name)
        };
        ctx.say(format!("{heading}\n{}", receipt.summary()?)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
