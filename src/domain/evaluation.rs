//! Seasonal price evaluation.
//!
//! Money arithmetic goes through `rust_decimal` and is stored back as `f64`,
//! rounded to cents. Amounts outside the decimal range are priced with plain
//! `f64` arithmetic instead.

use rust_decimal::prelude::*;
use time::Date;
use tracing::debug;

use super::entities::{ModifierType, PriceQuery, PriceResult, QueryDates, SeasonalPricingRule};

pub const NO_ADJUSTMENT_DESCRIPTION: &str = "No seasonal adjustments applied";

const CENT_PLACES: u32 = 2;

#[inline]
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

#[inline]
fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Cent rounding for the float path. Whole values (every `f64` above 2^52)
/// are returned as is.
#[inline]
fn round_cents_f64(value: f64) -> f64 {
    if !value.is_finite() || value.fract() == 0.0 {
        return value;
    }
    (value * 100.0).round() / 100.0
}

/// Activity is not checked here; see [`select_applicable_rules`].
pub fn is_in_window(date: Date, rule: &SeasonalPricingRule) -> bool {
    rule.window()
        .map(|(start, end)| start <= date && date <= end)
        .unwrap_or(false)
}

pub fn ranges_overlap(query_start: Date, query_end: Date, rule: &SeasonalPricingRule) -> bool {
    rule.window()
        .map(|(start, end)| query_start <= end && query_end >= start)
        .unwrap_or(false)
}

fn matches_dates(dates: &QueryDates, rule: &SeasonalPricingRule) -> bool {
    match *dates {
        QueryDates::Single { date } => is_in_window(date, rule),
        QueryDates::Range { start, end } => ranges_overlap(start, end, rule),
    }
}

/// Active rules matching the query, in input order.
pub fn select_applicable_rules<'a>(
    rules: &'a [SeasonalPricingRule],
    dates: &QueryDates,
) -> Vec<&'a SeasonalPricingRule> {
    rules
        .iter()
        .filter(|rule| rule.is_active && matches_dates(dates, rule))
        .collect()
}

fn modified_price(
    base: Decimal,
    modifier_type: Option<ModifierType>,
    value: Decimal,
) -> Option<Decimal> {
    match modifier_type {
        Some(ModifierType::Percentage) => value
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|rate| Decimal::ONE.checked_add(rate))
            .and_then(|factor| base.checked_mul(factor)),
        Some(ModifierType::Fixed) => base.checked_add(value),
        None => Some(base),
    }
}

fn modified_price_f64(base: f64, modifier_type: Option<ModifierType>, value: f64) -> f64 {
    match modifier_type {
        Some(ModifierType::Percentage) => base * (1.0 + value / 100.0),
        Some(ModifierType::Fixed) => base + value,
        None => base,
    }
}

/// Applies one modifier to `base_price`, without clamping or rounding.
///
/// An unrecognised modifier type (`None`) returns the base price unchanged.
pub fn apply_modifier(
    base_price: f64,
    modifier_type: Option<ModifierType>,
    modifier_value: f64,
) -> f64 {
    to_decimal(base_price)
        .zip(to_decimal(modifier_value))
        .and_then(|(base, value)| modified_price(base, modifier_type, value))
        .and_then(|price| price.to_f64())
        .unwrap_or_else(|| modified_price_f64(base_price, modifier_type, modifier_value))
}

/// `(adjusted_price, total_adjustment, adjustment_percentage)`
type Adjustment = (f64, f64, f64);

fn decimal_adjustment(base_price: f64, rule: &SeasonalPricingRule) -> Option<Adjustment> {
    let base = to_decimal(base_price)?;
    let value = to_decimal(rule.modifier_value)?;
    let adjusted = round_cents(modified_price(base, rule.modifier_type, value)?.max(Decimal::ZERO));
    let total = round_cents(adjusted.checked_sub(base)?);

    let adjusted_price = adjusted.to_f64()?;
    let total_adjustment = total.to_f64()?;
    let adjustment_percentage = if base.is_zero() {
        0.0
    } else {
        total
            .checked_div(base)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|pct| round_cents(pct).to_f64())
            .unwrap_or_else(|| percentage_f64(total_adjustment, base_price))
    };

    Some((adjusted_price, total_adjustment, adjustment_percentage))
}

fn float_adjustment(base_price: f64, rule: &SeasonalPricingRule) -> Adjustment {
    let raw = modified_price_f64(base_price, rule.modifier_type, rule.modifier_value);
    let adjusted = round_cents_f64(raw.max(0.0));
    let total = round_cents_f64(adjusted - base_price);
    (adjusted, total, percentage_f64(total, base_price))
}

fn percentage_f64(total: f64, base_price: f64) -> f64 {
    if base_price == 0.0 {
        return 0.0;
    }
    let pct = total / base_price * 100.0;
    if pct.is_finite() {
        round_cents_f64(pct)
    } else {
        0.0
    }
}

/// Prices `base_price` for the given dates.
///
/// Only the first applicable rule (by input order) is applied. Overlapping
/// seasons do not stack or compete on magnitude; later matches are reported in
/// `applicable_rules` but never change the price. The adjusted price is
/// floored at zero. Never fails; unmatched dates and unknown modifier types
/// fall back to the base price.
pub fn evaluate(base_price: f64, dates: QueryDates, rules: &[SeasonalPricingRule]) -> PriceResult {
    let applicable = select_applicable_rules(rules, &dates);
    let applicable_rules: Vec<SeasonalPricingRule> = applicable.iter().map(|r| (*r).clone()).collect();

    let Some(rule) = applicable.first() else {
        debug!(base_price, ?dates, rules = rules.len(), "no seasonal rule applies");
        return PriceResult {
            base_price,
            applicable_rules,
            applied_rule: None,
            adjusted_price: base_price,
            total_adjustment: 0.0,
            adjustment_percentage: 0.0,
            description: NO_ADJUSTMENT_DESCRIPTION.to_string(),
        };
    };

    let (adjusted_price, total_adjustment, adjustment_percentage) =
        decimal_adjustment(base_price, rule).unwrap_or_else(|| {
            debug!(
                base_price,
                modifier_value = rule.modifier_value,
                "amounts outside decimal range; pricing with f64"
            );
            float_adjustment(base_price, rule)
        });
    let description = describe(rule, adjustment_percentage);

    debug!(
        season = %rule.season_name,
        matched = applicable_rules.len(),
        base_price,
        adjusted_price,
        "applied seasonal rule"
    );

    PriceResult {
        base_price,
        applied_rule: Some((*rule).clone()),
        applicable_rules,
        adjusted_price,
        total_adjustment,
        adjustment_percentage,
        description,
    }
}

pub fn evaluate_query(query: &PriceQuery, rules: &[SeasonalPricingRule]) -> PriceResult {
    evaluate(query.base_price, query.dates, rules)
}

pub fn describe(rule: &SeasonalPricingRule, adjustment_percentage: f64) -> String {
    let kind = if rule.is_surcharge() {
        "Surcharge"
    } else {
        "Discount"
    };

    match rule.modifier_type {
        Some(ModifierType::Percentage) => format!(
            "{:.1}% {} {kind} Applied",
            adjustment_percentage.abs(),
            rule.season_name
        ),
        Some(ModifierType::Fixed) => format!(
            "{} {} {kind} Applied",
            format_amount(rule.modifier_value.abs()),
            rule.season_name
        ),
        None => NO_ADJUSTMENT_DESCRIPTION.to_string(),
    }
}

fn format_amount(amount: f64) -> String {
    let rounded = to_decimal(amount)
        .and_then(|value| round_cents(value).to_f64())
        .unwrap_or_else(|| round_cents_f64(amount));
    format!("${rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn summer(modifier_type: ModifierType, value: f64) -> SeasonalPricingRule {
        SeasonalPricingRule::new(
            "Summer",
            date!(2026 - 06 - 01),
            date!(2026 - 08 - 31),
            modifier_type,
            value,
        )
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let rule = summer(ModifierType::Percentage, 10.0);
        assert!(is_in_window(date!(2026 - 06 - 01), &rule));
        assert!(is_in_window(date!(2026 - 07 - 15), &rule));
        assert!(is_in_window(date!(2026 - 08 - 31), &rule));
        assert!(!is_in_window(date!(2026 - 05 - 31), &rule));
        assert!(!is_in_window(date!(2026 - 09 - 01), &rule));
    }

    #[test]
    fn window_ignores_activity() {
        let rule = summer(ModifierType::Percentage, 10.0).inactive();
        assert!(is_in_window(date!(2026 - 07 - 01), &rule));
    }

    #[test]
    fn unparsed_bounds_never_match() {
        let mut rule = summer(ModifierType::Percentage, 10.0);
        rule.end_date = None;
        assert!(!is_in_window(date!(2026 - 07 - 01), &rule));
        assert!(!ranges_overlap(date!(2026 - 01 - 01), date!(2026 - 12 - 31), &rule));
        assert!(select_applicable_rules(&[rule], &QueryDates::single(date!(2026 - 07 - 01))).is_empty());
    }

    #[test]
    fn range_overlap_edges() {
        let rule = summer(ModifierType::Fixed, 50.0);
        assert!(ranges_overlap(date!(2026 - 05 - 29), date!(2026 - 06 - 01), &rule));
        assert!(ranges_overlap(date!(2026 - 08 - 31), date!(2026 - 09 - 03), &rule));
        assert!(ranges_overlap(date!(2026 - 01 - 01), date!(2026 - 12 - 31), &rule));
        assert!(!ranges_overlap(date!(2026 - 05 - 25), date!(2026 - 05 - 31), &rule));
        assert!(!ranges_overlap(date!(2026 - 09 - 01), date!(2026 - 09 - 02), &rule));
    }

    #[test]
    fn selection_skips_inactive_and_keeps_order() {
        let rules = vec![
            summer(ModifierType::Percentage, 10.0).inactive(),
            SeasonalPricingRule::new(
                "Festival",
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 07),
                ModifierType::Fixed,
                200.0,
            ),
            summer(ModifierType::Percentage, -5.0),
        ];
        let picked = select_applicable_rules(&rules, &QueryDates::single(date!(2026 - 07 - 03)));
        let names: Vec<_> = picked.iter().map(|r| r.season_name.as_str()).collect();
        assert_eq!(names, vec!["Festival", "Summer"]);
        assert_eq!(picked[1].modifier_value, -5.0);
    }

    #[test]
    fn modifier_arithmetic() {
        assert_eq!(apply_modifier(1000.0, Some(ModifierType::Percentage), 15.0), 1150.0);
        assert_eq!(apply_modifier(1000.0, Some(ModifierType::Percentage), -10.0), 900.0);
        assert_eq!(apply_modifier(250.0, Some(ModifierType::Fixed), -75.5), 174.5);
        assert_eq!(apply_modifier(250.0, None, 99.0), 250.0);
        // Not clamped at this level.
        assert_eq!(apply_modifier(100.0, Some(ModifierType::Fixed), -150.0), -50.0);
    }

    #[test]
    fn unknown_modifier_passes_base_through() {
        let mut rule = summer(ModifierType::Percentage, 30.0);
        rule.modifier_type = None;
        let result = evaluate(400.0, QueryDates::single(date!(2026 - 07 - 01)), &[rule]);
        assert_eq!(result.adjusted_price, 400.0);
        assert_eq!(result.total_adjustment, 0.0);
        assert_eq!(result.applicable_rules.len(), 1);
        assert_eq!(result.description, NO_ADJUSTMENT_DESCRIPTION);
    }

    #[test]
    fn zero_base_reports_zero_percentage() {
        let rule = summer(ModifierType::Fixed, 120.0);
        let result = evaluate(0.0, QueryDates::single(date!(2026 - 07 - 01)), &[rule]);
        assert_eq!(result.adjusted_price, 120.0);
        assert_eq!(result.total_adjustment, 120.0);
        assert_eq!(result.adjustment_percentage, 0.0);
        assert!(result.adjustment_percentage.is_finite());
    }

    #[test]
    fn rounds_to_cents() {
        let rule = summer(ModifierType::Percentage, 33.333);
        let result = evaluate(99.99, QueryDates::single(date!(2026 - 07 - 01)), &[rule]);
        assert_eq!(result.adjusted_price, 133.32);
        assert_eq!(result.total_adjustment, 33.33);
        assert_eq!(result.adjustment_percentage, 33.33);
    }

    #[test]
    fn describes_percentage_rules() {
        let surcharge = summer(ModifierType::Percentage, 12.5);
        assert_eq!(describe(&surcharge, 12.5), "12.5% Summer Surcharge Applied");

        let discount = summer(ModifierType::Percentage, -20.0);
        assert_eq!(describe(&discount, -20.0), "20.0% Summer Discount Applied");
    }

    #[test]
    fn describes_fixed_rules_as_currency() {
        let surcharge = summer(ModifierType::Fixed, 150.0);
        assert_eq!(describe(&surcharge, 15.0), "$150.00 Summer Surcharge Applied");

        let discount = summer(ModifierType::Fixed, -49.5);
        assert_eq!(describe(&discount, -4.95), "$49.50 Summer Discount Applied");
    }

    #[test]
    fn zero_modifier_reads_as_discount() {
        let rule = summer(ModifierType::Percentage, 0.0);
        assert_eq!(describe(&rule, 0.0), "0.0% Summer Discount Applied");
    }

    fn midsummer() -> QueryDates {
        QueryDates::single(date!(2026 - 07 - 01))
    }

    #[test]
    fn large_percentage_does_not_overflow() {
        let rule = summer(ModifierType::Percentage, 1e12);
        let result = evaluate(1e20, midsummer(), &[rule]);
        assert!(result.adjusted_price.is_finite());
        assert!(result.adjusted_price > 1e29);
        assert!(result.total_adjustment > 0.0);
        assert!(result.description.contains("Surcharge"));
    }

    #[test]
    fn large_fixed_amount_does_not_overflow() {
        let rule = summer(ModifierType::Fixed, 7e28);
        let result = evaluate(7e28, midsummer(), &[rule]);
        assert_eq!(result.adjusted_price, 1.4e29);
        assert_eq!(result.total_adjustment, 7e28);
        assert_eq!(result.adjustment_percentage, 100.0);
    }

    #[test]
    fn tiny_base_keeps_percentage_finite() {
        let rule = summer(ModifierType::Fixed, 1e10);
        let result = evaluate(1e-28, midsummer(), &[rule]);
        assert_eq!(result.adjusted_price, 1e10);
        assert_eq!(result.total_adjustment, 1e10);
        assert!(result.adjustment_percentage.is_finite());
    }

    #[test]
    fn base_beyond_decimal_range_still_reconciles() {
        let rule = summer(ModifierType::Percentage, 10.0);
        let base = 1e30;
        let result = evaluate(base, midsummer(), &[rule]);
        assert!(result.adjusted_price > base);
        assert!((result.adjusted_price - result.total_adjustment - base).abs() < 0.01);
        assert_eq!(result.adjustment_percentage, 10.0);

        let doubling = summer(ModifierType::Percentage, 100.0);
        let base = 2f64.powi(100);
        let result = evaluate(base, midsummer(), &[doubling]);
        assert_eq!(result.adjusted_price, base * 2.0);
        assert_eq!(result.total_adjustment, base);
        assert_eq!(result.adjusted_price - result.total_adjustment, base);
    }

    #[test]
    fn modifier_beyond_decimal_range_is_not_dropped() {
        let rule = summer(ModifierType::Percentage, 1e30);
        let result = evaluate(100.0, midsummer(), &[rule]);
        assert!(result.adjusted_price > 1e29);

        assert_eq!(apply_modifier(100.0, Some(ModifierType::Fixed), 1e30), 1e30);
        assert_eq!(apply_modifier(1e30, Some(ModifierType::Percentage), 100.0), 2e30);
    }

    #[test]
    fn huge_discount_clamps_on_float_path() {
        let rule = summer(ModifierType::Fixed, -1e30);
        let result = evaluate(500.0, midsummer(), &[rule]);
        assert_eq!(result.adjusted_price, 0.0);
        assert_eq!(result.total_adjustment, -500.0);
        assert_eq!(result.adjustment_percentage, -100.0);
    }
}
