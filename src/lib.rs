//! Seasonal pricing for Weekender Events venue bookings.
//!
//! [`domain`] holds the pure evaluator, [`infra`] decodes rule exports and
//! booking input, and [`util`] carries settings and version helpers for the
//! command line front end.

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    evaluate, evaluate_query, ModifierType, PriceQuery, PriceResult, QueryDates,
    SeasonalPricingRule,
};
