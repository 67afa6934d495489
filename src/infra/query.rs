//! Turning loosely typed booking input into a [`PriceQuery`].

use thiserror::Error;

use crate::domain::{parse_calendar_day, PriceQuery, QueryDates};

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("base price must be a finite number, got {0}")]
    InvalidPrice(f64),
    #[error("could not read {field} as a date: {raw:?}")]
    InvalidDate { field: &'static str, raw: String },
    #[error("range ends ({end}) before it starts ({start})")]
    ReversedRange { start: String, end: String },
    #[error("give either an event date or both range bounds")]
    MissingDates,
}

/// Raw booking input as it arrives from a form or command line.
#[derive(Clone, Debug, Default)]
pub struct QuoteRequest {
    pub base_price: f64,
    pub event_date: Option<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
}

impl TryFrom<QuoteRequest> for PriceQuery {
    type Error = QueryError;

    fn try_from(request: QuoteRequest) -> Result<Self, Self::Error> {
        if !request.base_price.is_finite() {
            return Err(QueryError::InvalidPrice(request.base_price));
        }

        let dates = match (request.event_date, request.range_start, request.range_end) {
            (Some(date), None, None) => QueryDates::single(parse_field("event date", date)?),
            (None, Some(start), Some(end)) => {
                let start_day = parse_field("range start", start.clone())?;
                let end_day = parse_field("range end", end.clone())?;
                if end_day < start_day {
                    return Err(QueryError::ReversedRange { start, end });
                }
                QueryDates::range(start_day, end_day)
            }
            _ => return Err(QueryError::MissingDates),
        };

        Ok(PriceQuery::new(request.base_price, dates))
    }
}

fn parse_field(field: &'static str, raw: String) -> Result<time::Date, QueryError> {
    parse_calendar_day(&raw).ok_or(QueryError::InvalidDate { field, raw })
}
