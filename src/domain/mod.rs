//! Seasonal pricing domain: rule model, calendar handling and the evaluator.

pub mod calendar;
pub mod entities;
pub mod evaluation;

pub use calendar::{days_between, parse_calendar_day, to_calendar_day};
pub use entities::{ModifierType, PriceQuery, PriceResult, QueryDates, SeasonalPricingRule};
pub use evaluation::{
    apply_modifier, describe, evaluate, evaluate_query, is_in_window, ranges_overlap,
    select_applicable_rules, NO_ADJUSTMENT_DESCRIPTION,
};
