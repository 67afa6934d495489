use serde::Serialize;
use time::Date;
use uuid::Uuid;

/// How a rule's `modifier_value` is applied to the base price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    Percentage,
    Fixed,
}

/// A named, time-bounded price modifier for a venue.
///
/// `start_date` and `end_date` are inclusive calendar days. A bound is `None`
/// when the source value could not be parsed; such a rule never matches.
/// `modifier_type` is `None` when the source carried a type this crate does
/// not recognise; applying it leaves the base price unchanged.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonalPricingRule {
    pub id: Option<Uuid>,
    pub season_name: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_active: bool,
    pub modifier_type: Option<ModifierType>,
    pub modifier_value: f64,
}

impl SeasonalPricingRule {
    pub fn new(
        season_name: impl Into<String>,
        start_date: Date,
        end_date: Date,
        modifier_type: ModifierType,
        modifier_value: f64,
    ) -> Self {
        Self {
            id: None,
            season_name: season_name.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
            is_active: true,
            modifier_type: Some(modifier_type),
            modifier_value,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn window(&self) -> Option<(Date, Date)> {
        Some((self.start_date?, self.end_date?))
    }

    /// Positive values raise the price; zero and negative values are reported
    /// as discounts.
    pub fn is_surcharge(&self) -> bool {
        self.modifier_value > 0.0
    }
}

/// The day or days being priced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryDates {
    Single { date: Date },
    Range { start: Date, end: Date },
}

impl QueryDates {
    pub fn single(date: Date) -> Self {
        QueryDates::Single { date }
    }

    pub fn range(start: Date, end: Date) -> Self {
        QueryDates::Range { start, end }
    }

    pub fn bounds(&self) -> (Date, Date) {
        match *self {
            QueryDates::Single { date } => (date, date),
            QueryDates::Range { start, end } => (start, end),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceQuery {
    pub base_price: f64,
    pub dates: QueryDates,
}

impl PriceQuery {
    pub fn new(base_price: f64, dates: QueryDates) -> Self {
        Self { base_price, dates }
    }
}

/// Outcome of pricing one query against a rule set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceResult {
    pub base_price: f64,
    /// Every active rule overlapping the query, in input order.
    pub applicable_rules: Vec<SeasonalPricingRule>,
    /// The single rule that produced the adjustment.
    pub applied_rule: Option<SeasonalPricingRule>,
    pub adjusted_price: f64,
    pub total_adjustment: f64,
    pub adjustment_percentage: f64,
    pub description: String,
}
