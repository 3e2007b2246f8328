//! Loyalty arithmetic - points accrual, milestone bonus and withdrawal debits.
//!
//! Everything here is pure and storage-agnostic. Amounts arrive as reais (`f64`)
//! and must be a whole number of cents. They are converted to integer cents before
//! any comparison or subtraction.

use crate::errors::{Error, Result};

/// Points-to-bonus conversion: every `points_per_milestone` accumulated points
/// are worth `bonus_per_milestone` reais of bonus credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyRules {
    points_per_milestone: i64,
    bonus_cents_per_milestone: i64,
}

impl Default for LoyaltyRules {
    /// 500 points → R$ 10.00
    fn default() -> Self {
        Self {
            points_per_milestone: 500,
            bonus_cents_per_milestone: 1_000,
        }
    }
}

/// A client's balances before or after an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    /// Accumulated points
    pub points: i64,
    /// Bonus credit in reais
    pub bonus: f64,
}

/// Result of applying a purchase to a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseOutcome {
    /// Purchase value in reais
    pub amount: f64,
    /// Multiplier that was actually applied
    pub multiplier: i32,
    /// `floor(amount × multiplier)`
    pub points_generated: i64,
    /// Points after the purchase
    pub new_points: i64,
    /// Bonus recomputed from `new_points`
    pub new_bonus: f64,
    /// `new_bonus - previous bonus`; zero when no milestone was crossed
    pub bonus_generated: f64,
}

/// Result of applying a bonus withdrawal to a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalOutcome {
    /// Bonus withdrawn in reais
    pub amount: f64,
    /// Points debited for the withdrawn bonus, before clamping at zero
    pub points_removed: i64,
    /// Points after the withdrawal, never negative
    pub new_points: i64,
    /// Bonus left after the withdrawal
    pub new_bonus: f64,
}

/// Converts reais to whole cents, rounding to the nearest cent.
#[must_use]
pub fn to_cents(amount: f64) -> i64 {
    // Currency values handled here are far below 2^53 cents.
    #[allow(clippy::cast_possible_truncation)]
    let cents = (amount * 100.0).round() as i64;
    cents
}

/// Converts whole cents back to reais.
#[must_use]
pub fn from_cents(cents: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let reais = cents as f64 / 100.0;
    reais
}

/// Tolerance for binary floating-point noise, far below one cent
const EPSILON: f64 = 1e-6;

/// Whether `amount` is a whole number of cents, e.g. `19.99` but not `19.999`.
#[must_use]
pub fn is_whole_cents(amount: f64) -> bool {
    let scaled = amount * 100.0;
    (scaled - scaled.round()).abs() <= EPSILON
}

/// `floor(amount × multiplier)`.
///
/// A product that is within floating-point noise of an integer counts as that
/// integer, so `0.29 × 100` yields 29.
#[must_use]
pub fn points_for_purchase(amount: f64, multiplier: i32) -> i64 {
    let product = amount * f64::from(multiplier);
    let nearest = product.round();
    let points = if (product - nearest).abs() <= EPSILON {
        nearest
    } else {
        product.floor()
    };
    #[allow(clippy::cast_possible_truncation)]
    let points = points as i64;
    points
}

/// Rejects amounts that are not finite, not positive, or not a whole number of cents.
///
/// # Errors
/// Returns `Error::InvalidAmount` for any rejected amount.
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || !is_whole_cents(amount) || to_cents(amount) <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

impl LoyaltyRules {
    /// Builds rules from a milestone size and the bonus (in reais) it is worth.
    ///
    /// # Errors
    /// Returns `Error::Config` when either value is not strictly positive.
    pub fn new(points_per_milestone: i64, bonus_per_milestone: f64) -> Result<Self> {
        if points_per_milestone <= 0 {
            return Err(Error::Config {
                message: format!(
                    "points_per_milestone must be positive, got {points_per_milestone}"
                ),
            });
        }
        if !bonus_per_milestone.is_finite() || to_cents(bonus_per_milestone) <= 0 {
            return Err(Error::Config {
                message: format!(
                    "bonus_per_milestone must be a positive amount, got {bonus_per_milestone}"
                ),
            });
        }
        Ok(Self {
            points_per_milestone,
            bonus_cents_per_milestone: to_cents(bonus_per_milestone),
        })
    }

    /// Points that make up one milestone.
    #[must_use]
    pub const fn points_per_milestone(&self) -> i64 {
        self.points_per_milestone
    }

    /// Bonus granted per milestone, in reais.
    #[must_use]
    pub fn bonus_per_milestone(&self) -> f64 {
        from_cents(self.bonus_cents_per_milestone)
    }

    fn bonus_cents_for_points(&self, total_points: i64) -> i64 {
        total_points.max(0) / self.points_per_milestone * self.bonus_cents_per_milestone
    }

    /// `floor(total_points / 500) × 10` with the default rules.
    #[must_use]
    pub fn bonus_for_points(&self, total_points: i64) -> f64 {
        from_cents(self.bonus_cents_for_points(total_points))
    }

    /// Points that correspond to a bonus amount: `(amount / 10) × 500` with the
    /// default rules, rounded half up to whole points.
    #[must_use]
    pub fn points_for_bonus(&self, amount: f64) -> i64 {
        let numerator = to_cents(amount).max(0).saturating_mul(self.points_per_milestone);
        let denominator = self.bonus_cents_per_milestone;
        (numerator.saturating_mul(2) + denominator) / (denominator * 2)
    }

    /// Accrues points for a purchase and recomputes the bonus from the new total.
    ///
    /// The bonus is replaced wholesale rather than incremented.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for non-finite, non-positive or sub-cent amounts
    /// and `Error::InvalidMultiplier` for multipliers below 1.
    pub fn apply_purchase(
        &self,
        balance: Balance,
        amount: f64,
        multiplier: i32,
    ) -> Result<PurchaseOutcome> {
        validate_amount(amount)?;
        if multiplier < 1 {
            return Err(Error::InvalidMultiplier { multiplier });
        }

        let points_generated = points_for_purchase(amount, multiplier);
        let new_points = balance.points.saturating_add(points_generated);
        let new_bonus_cents = self.bonus_cents_for_points(new_points);
        let bonus_generated_cents = new_bonus_cents - to_cents(balance.bonus);

        Ok(PurchaseOutcome {
            amount,
            multiplier,
            points_generated,
            new_points,
            new_bonus: from_cents(new_bonus_cents),
            bonus_generated: from_cents(bonus_generated_cents),
        })
    }

    /// Debits bonus credit and the points it was worth.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for non-finite, non-positive or sub-cent amounts
    /// and `Error::InsufficientBonus` when the amount exceeds the current bonus.
    pub fn apply_withdrawal(&self, balance: Balance, amount: f64) -> Result<WithdrawalOutcome> {
        validate_amount(amount)?;

        let amount_cents = to_cents(amount);
        let bonus_cents = to_cents(balance.bonus);
        if amount_cents > bonus_cents {
            return Err(Error::InsufficientBonus {
                available: balance.bonus,
                requested: amount,
            });
        }

        let points_removed = self.points_for_bonus(amount);
        let new_points = (balance.points - points_removed).max(0);

        Ok(WithdrawalOutcome {
            amount,
            points_removed,
            new_points,
            new_bonus: from_cents(bonus_cents - amount_cents),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const fn balance(points: i64, bonus: f64) -> Balance {
        Balance { points, bonus }
    }

    #[test]
    fn test_points_for_purchase_floors() {
        assert_eq!(points_for_purchase(120.0, 1), 120);
        assert_eq!(points_for_purchase(25.0, 2), 50);
        assert_eq!(points_for_purchase(19.99, 1), 19);
        assert_eq!(points_for_purchase(19.99, 3), 59);
        assert_eq!(points_for_purchase(0.0, 5), 0);
    }

    #[test]
    fn test_points_for_purchase_floors_sub_cent_values() {
        assert_eq!(points_for_purchase(19.999, 1), 19);
        assert_eq!(points_for_purchase(0.999, 1), 0);
        assert_eq!(points_for_purchase(0.0199, 1_000), 19);
    }

    #[test]
    fn test_whole_cents() {
        assert!(is_whole_cents(19.99));
        assert!(is_whole_cents(0.29));
        assert!(is_whole_cents(120.0));
        assert!(!is_whole_cents(19.999));
        assert!(!is_whole_cents(5.004));
    }

    #[test]
    fn test_purchase_rejects_sub_cent_amount() {
        let rules = LoyaltyRules::default();
        let result = rules.apply_purchase(balance(0, 0.0), 19.999, 1);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_withdrawal_just_above_bonus_is_rejected() {
        let rules = LoyaltyRules::default();
        let result = rules.apply_withdrawal(balance(250, 5.0), 5.004);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        let result = rules.apply_withdrawal(balance(250, 5.0), 5.01);
        assert!(matches!(result, Err(Error::InsufficientBonus { .. })));
    }

    #[test]
    fn test_points_for_purchase_is_exact_on_cents() {
        // 0.29 * 100 is 28.999... in binary floating point
        assert_eq!(points_for_purchase(0.29, 100), 29);
        assert_eq!(points_for_purchase(4.35, 100), 435);
    }

    #[test]
    fn test_bonus_for_points_milestones() {
        let rules = LoyaltyRules::default();
        assert_eq!(rules.bonus_for_points(0), 0.0);
        assert_eq!(rules.bonus_for_points(499), 0.0);
        assert_eq!(rules.bonus_for_points(500), 10.0);
        assert_eq!(rules.bonus_for_points(530), 10.0);
        assert_eq!(rules.bonus_for_points(1_499), 20.0);
        assert_eq!(rules.bonus_for_points(1_500), 30.0);
    }

    #[test]
    fn test_bonus_matches_recomputation_after_purchase() {
        let rules = LoyaltyRules::default();
        let mut current = balance(0, 0.0);
        for (amount, multiplier) in [(120.0, 1), (250.5, 2), (99.99, 3), (0.01, 1), (1_000.0, 1)] {
            let outcome = rules.apply_purchase(current, amount, multiplier).unwrap();
            assert_eq!(rules.bonus_for_points(outcome.new_points), outcome.new_bonus);
            current = balance(outcome.new_points, outcome.new_bonus);
        }
    }

    #[test]
    fn test_recomputing_stored_bonus_changes_nothing() {
        let rules = LoyaltyRules::default();
        for points in [0, 1, 499, 500, 501, 999, 1_000, 12_345] {
            let stored = balance(points, rules.bonus_for_points(points));
            assert_eq!(rules.bonus_for_points(stored.points), stored.bonus);

            // The smallest purchases at 1x earn no points
            let outcome = rules.apply_purchase(stored, 0.5, 1).unwrap();
            assert_eq!(outcome.points_generated, 0);
            assert_eq!(outcome.new_bonus, stored.bonus);
            assert_eq!(outcome.bonus_generated, 0.0);
        }
    }

    #[test]
    fn test_points_for_bonus_inverse_rate() {
        let rules = LoyaltyRules::default();
        assert_eq!(rules.points_for_bonus(10.0), 500);
        assert_eq!(rules.points_for_bonus(8.0), 400);
        assert_eq!(rules.points_for_bonus(0.5), 25);
        // 0.01 reais is half a point, rounded up
        assert_eq!(rules.points_for_bonus(0.01), 1);
    }

    #[test]
    fn test_purchase_first_purchase_no_promotion() {
        let rules = LoyaltyRules::default();
        let outcome = rules.apply_purchase(balance(0, 0.0), 120.0, 1).unwrap();
        assert_eq!(outcome.points_generated, 120);
        assert_eq!(outcome.new_points, 120);
        assert_eq!(outcome.new_bonus, 0.0);
        assert_eq!(outcome.bonus_generated, 0.0);
    }

    #[test]
    fn test_purchase_crossing_milestone_with_multiplier() {
        let rules = LoyaltyRules::default();
        let outcome = rules.apply_purchase(balance(480, 0.0), 25.0, 2).unwrap();
        assert_eq!(outcome.points_generated, 50);
        assert_eq!(outcome.new_points, 530);
        assert_eq!(outcome.new_bonus, 10.0);
        assert_eq!(outcome.bonus_generated, 10.0);
        assert_eq!(outcome.multiplier, 2);
    }

    #[test]
    fn test_purchase_replaces_bonus_instead_of_adding() {
        let rules = LoyaltyRules::default();
        // Partial withdrawal left 5.00 bonus and 270 points
        let outcome = rules.apply_purchase(balance(270, 5.0), 10.0, 1).unwrap();
        assert_eq!(outcome.new_points, 280);
        assert_eq!(outcome.new_bonus, 0.0);
        assert_eq!(outcome.bonus_generated, -5.0);
    }

    #[test]
    fn test_purchase_rejects_invalid_amounts() {
        let rules = LoyaltyRules::default();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY, 0.001] {
            let result = rules.apply_purchase(balance(0, 0.0), amount, 1);
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
    }

    #[test]
    fn test_purchase_rejects_multiplier_below_one() {
        let rules = LoyaltyRules::default();
        let result = rules.apply_purchase(balance(0, 0.0), 10.0, 0);
        assert!(matches!(
            result,
            Err(Error::InvalidMultiplier { multiplier: 0 })
        ));
    }

    #[test]
    fn test_withdrawal_full_bonus() {
        let rules = LoyaltyRules::default();
        let outcome = rules.apply_withdrawal(balance(500, 10.0), 10.0).unwrap();
        assert_eq!(outcome.new_bonus, 0.0);
        assert_eq!(outcome.points_removed, 500);
        assert_eq!(outcome.new_points, 0);
    }

    #[test]
    fn test_withdrawal_never_drives_points_negative() {
        let rules = LoyaltyRules::default();
        let outcome = rules.apply_withdrawal(balance(100, 20.0), 20.0).unwrap();
        assert_eq!(outcome.points_removed, 1_000);
        assert_eq!(outcome.new_points, 0);
    }

    #[test]
    fn test_withdrawal_partial_keeps_cents_exact() {
        let rules = LoyaltyRules::default();
        let outcome = rules.apply_withdrawal(balance(1_000, 20.0), 3.3).unwrap();
        assert_eq!(outcome.new_bonus, 16.7);
        assert_eq!(outcome.points_removed, 165);
        assert_eq!(outcome.new_points, 835);
    }

    #[test]
    fn test_withdrawal_insufficient_bonus() {
        let rules = LoyaltyRules::default();
        let result = rules.apply_withdrawal(balance(250, 5.0), 8.0);
        assert!(matches!(
            result,
            Err(Error::InsufficientBonus {
                available: 5.0,
                requested: 8.0
            })
        ));
    }

    #[test]
    fn test_custom_rules() {
        let rules = LoyaltyRules::new(1_000, 25.0).unwrap();
        assert_eq!(rules.points_per_milestone(), 1_000);
        assert_eq!(rules.bonus_per_milestone(), 25.0);
        assert_eq!(rules.bonus_for_points(2_500), 50.0);
        assert_eq!(rules.points_for_bonus(25.0), 1_000);
    }

    #[test]
    fn test_rules_reject_non_positive_values() {
        assert!(LoyaltyRules::new(0, 10.0).is_err());
        assert!(LoyaltyRules::new(500, 0.0).is_err());
        assert!(LoyaltyRules::new(500, f64::NAN).is_err());
    }
}
