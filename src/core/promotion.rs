//! Promotion business logic - Handles the multiplier campaign registry.
//!
//! Provides the validity rule used at purchase time, the display-time correction for
//! expired promotions, and create/toggle/delete operations for staff. Date windows are
//! inclusive on both ends.

use crate::{
    entities::{Promotion, promotion},
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Whether a promotion may be applied to a purchase at `now`.
///
/// Valid iff the stored flag is on and `now` lies inside `[starts_at, ends_at]`,
/// with a missing bound treated as open.
#[must_use]
pub fn is_currently_valid(promotion: &promotion::Model, now: DateTime<Utc>) -> bool {
    promotion.active
        && promotion.starts_at.is_none_or(|start| start <= now)
        && promotion.ends_at.is_none_or(|end| end >= now)
}

/// Active flag as shown to staff: a promotion whose end date has passed is displayed
/// as inactive even if the stored flag was never switched off. Nothing is persisted.
#[must_use]
pub fn is_effectively_active(promotion: &promotion::Model, now: DateTime<Utc>) -> bool {
    promotion.active && promotion.ends_at.is_none_or(|end| end >= now)
}

/// Multiplier to apply for an optional selected promotion, falling back to 1 when
/// nothing is selected or the selection is no longer valid.
#[must_use]
pub fn effective_multiplier(selected: Option<&promotion::Model>, now: DateTime<Utc>) -> i32 {
    selected
        .filter(|promotion| is_currently_valid(promotion, now))
        .map_or(1, |promotion| promotion.multiplier)
}

/// Parses a staff-entered `YYYY-MM-DD` start date as the first instant of that local day.
///
/// # Errors
/// Returns `Error::InvalidDate` if the input is not a calendar date.
pub fn parse_start_date(input: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    local_instant(input, NaiveTime::MIN, offset)
}

/// Parses a staff-entered `YYYY-MM-DD` end date as the last second of that local day.
///
/// # Errors
/// Returns `Error::InvalidDate` if the input is not a calendar date.
pub fn parse_end_date(input: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_instant(input, end_of_day, offset)
}

fn local_instant(input: &str, time: NaiveTime, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let invalid = || Error::InvalidDate {
        input: input.to_string(),
    };
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// Retrieves every promotion that can be applied right now, ordered by name.
pub async fn list_valid_promotions(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<promotion::Model>> {
    let active = Promotion::find()
        .filter(promotion::Column::Active.eq(true))
        .order_by_asc(promotion::Column::Name)
        .all(db)
        .await?;

    Ok(active
        .into_iter()
        .filter(|promotion| is_currently_valid(promotion, now))
        .collect())
}

/// Retrieves all promotions for the manager view: stored-active first, newest first.
pub async fn list_all_promotions(db: &DatabaseConnection) -> Result<Vec<promotion::Model>> {
    Promotion::find()
        .order_by_desc(promotion::Column::Active)
        .order_by_desc(promotion::Column::CreatedAt)
        .order_by_desc(promotion::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a promotion by its unique ID.
pub async fn get_promotion_by_id(
    db: &DatabaseConnection,
    promotion_id: i64,
) -> Result<Option<promotion::Model>> {
    Promotion::find_by_id(promotion_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a promotion by exact name. When several share a name, the newest wins.
pub async fn get_promotion_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<promotion::Model>> {
    Promotion::find()
        .filter(promotion::Column::Name.eq(name.trim()))
        .order_by_desc(promotion::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new promotion. Promotions are always created active.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The multiplier is below 1
/// - Both dates are set and the start is after the end
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_promotion(
    db: &DatabaseConnection,
    name: String,
    multiplier: i32,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<promotion::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Promotion name cannot be empty".to_string(),
        });
    }

    if multiplier < 1 {
        return Err(Error::InvalidMultiplier { multiplier });
    }

    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if start > end {
            return Err(Error::InvalidPromotionWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
    }

    let promotion = promotion::ActiveModel {
        name: Set(name.trim().to_string()),
        multiplier: Set(multiplier),
        active: Set(true),
        starts_at: Set(starts_at),
        ends_at: Set(ends_at),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = promotion.insert(db).await?;
    info!(promotion_id = result.id, "Promotion created");
    Ok(result)
}

/// Flips the stored active flag of a promotion and returns the updated row.
///
/// # Errors
/// Returns `Error::PromotionNotFound` if no promotion has this ID.
#[instrument(skip(db))]
pub async fn toggle_promotion(
    db: &DatabaseConnection,
    promotion_id: i64,
) -> Result<promotion::Model> {
    let existing = get_promotion_by_id(db, promotion_id)
        .await?
        .ok_or_else(|| Error::PromotionNotFound {
            name: promotion_id.to_string(),
        })?;

    let new_state = !existing.active;
    let mut active: promotion::ActiveModel = existing.into();
    active.active = Set(new_state);
    let updated = active.update(db).await?;

    info!(promotion_id, active = new_state, "Promotion toggled");
    Ok(updated)
}

/// Permanently removes a promotion.
///
/// # Errors
/// Returns `Error::PromotionNotFound` if no promotion has this ID.
#[instrument(skip(db))]
pub async fn delete_promotion(db: &DatabaseConnection, promotion_id: i64) -> Result<()> {
    let result = Promotion::delete_by_id(promotion_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::PromotionNotFound {
            name: promotion_id.to_string(),
        });
    }
    info!(promotion_id, "Promotion deleted");
    Ok(())
}
