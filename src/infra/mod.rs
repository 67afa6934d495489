//! Adapters between the booking backend's data and the pricing domain.

pub mod query;
pub mod rules;

pub use query::{QueryError, QuoteRequest};
pub use rules::{
    inspect_rules, load_rules, parse_modifier_type, parse_rules, parse_rules_str, RuleIssue,
    RuleIssueKind, RulesError,
};
