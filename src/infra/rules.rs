//! Decoding of seasonal pricing rules exported from the venue backend.
//!
//! - Accepts `snake_case` rows as stored and `camelCase` rows as the app sees them.
//! - Rows that fail to decode are skipped; dates that fail to parse are kept
//!   as missing bounds so the rule never matches.

use std::{fmt, fs, io, path::Path};

use serde::Deserialize;
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{parse_calendar_day, ModifierType, SeasonalPricingRule};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode rules: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected an array of rules or an object with a `data` array")]
    UnexpectedShape,
}

pub fn load_rules(path: &Path) -> Result<Vec<SeasonalPricingRule>, RulesError> {
    let content = fs::read_to_string(path)?;
    let rules = parse_rules_str(&content)?;
    info!(
        path = %path.display(),
        rules = rules.len(),
        "loaded seasonal pricing rules"
    );
    Ok(rules)
}

pub fn parse_rules_str(content: &str) -> Result<Vec<SeasonalPricingRule>, RulesError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    parse_rules(value)
}

/// Decodes a bare array of rows or a `{ "data": [...] }` envelope.
pub fn parse_rules(value: serde_json::Value) -> Result<Vec<SeasonalPricingRule>, RulesError> {
    let rows = match value {
        serde_json::Value::Array(rows) => rows,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(rows)) => rows,
            _ => return Err(RulesError::UnexpectedShape),
        },
        _ => return Err(RulesError::UnexpectedShape),
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| parse_rule_entry(index, row))
        .collect())
}

fn parse_rule_entry(index: usize, entry: serde_json::Value) -> Option<SeasonalPricingRule> {
    match serde_json::from_value::<SeasonalRuleDto>(entry) {
        Ok(dto) => Some(SeasonalPricingRule::from(dto)),
        Err(err) => {
            warn!(index, error = %err, "skipping undecodable pricing rule row");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeasonalRuleDto {
    #[serde(default, deserialize_with = "optional_string_from_json")]
    id: Option<String>,
    #[serde(alias = "seasonName", alias = "name")]
    season_name: String,
    #[serde(default, alias = "startDate")]
    start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    end_date: Option<String>,
    #[serde(default, alias = "isActive")]
    is_active: Option<bool>,
    #[serde(default, alias = "modifierType")]
    modifier_type: Option<String>,
    #[serde(alias = "modifierValue", deserialize_with = "number_from_json")]
    modifier_value: f64,
}

impl From<SeasonalRuleDto> for SeasonalPricingRule {
    fn from(dto: SeasonalRuleDto) -> Self {
        let start_date = parse_bound(&dto.season_name, "start_date", dto.start_date.as_deref());
        let end_date = parse_bound(&dto.season_name, "end_date", dto.end_date.as_deref());
        let modifier_type = dto.modifier_type.as_deref().and_then(parse_modifier_type);
        if modifier_type.is_none() {
            debug!(
                season = %dto.season_name,
                raw = ?dto.modifier_type,
                "unrecognised modifier type; rule will not change prices"
            );
        }

        Self {
            id: dto.id.as_deref().and_then(|raw| Uuid::parse_str(raw).ok()),
            season_name: dto.season_name,
            start_date,
            end_date,
            is_active: dto.is_active.unwrap_or(true),
            modifier_type,
            modifier_value: dto.modifier_value,
        }
    }
}

fn parse_bound(season: &str, field: &str, raw: Option<&str>) -> Option<Date> {
    let raw = raw?;
    let parsed = parse_calendar_day(raw);
    if parsed.is_none() {
        warn!(season, field, raw, "unparseable rule date; rule will never match");
    }
    parsed
}

pub fn parse_modifier_type(raw: &str) -> Option<ModifierType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "percentage" | "percent" | "%" => Some(ModifierType::Percentage),
        "fixed" | "fixed_amount" | "amount" => Some(ModifierType::Fixed),
        _ => None,
    }
}

/// A rule that can never affect a price, and why.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleIssue {
    pub index: usize,
    pub season_name: String,
    pub kind: RuleIssueKind,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RuleIssueKind {
    #[error("start date is missing or unparseable")]
    MissingStartDate,
    #[error("end date is missing or unparseable")]
    MissingEndDate,
    #[error("window is reversed ({start} is after {end})")]
    ReversedWindow { start: Date, end: Date },
    #[error("modifier type is not percentage or fixed")]
    UnknownModifierType,
    #[error("modifier value is not a finite number")]
    NonFiniteValue,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.season_name, self.kind)
    }
}

/// Lists problems that stop a rule from ever matching or from changing a price.
pub fn inspect_rules(rules: &[SeasonalPricingRule]) -> Vec<RuleIssue> {
    let mut issues = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        let mut push = |kind| {
            issues.push(RuleIssue {
                index,
                season_name: rule.season_name.clone(),
                kind,
            })
        };

        if rule.start_date.is_none() {
            push(RuleIssueKind::MissingStartDate);
        }
        if rule.end_date.is_none() {
            push(RuleIssueKind::MissingEndDate);
        }
        if let Some((start, end)) = rule.window() {
            if start > end {
                push(RuleIssueKind::ReversedWindow { start, end });
            }
        }
        if rule.modifier_type.is_none() {
            push(RuleIssueKind::UnknownModifierType);
        }
        if !rule.modifier_value.is_finite() {
            push(RuleIssueKind::NonFiniteValue);
        }
    }
    issues
}

fn number_from_json<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct NumberOrString;

    impl<'de> serde::de::Visitor<'de> for NumberOrString {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

fn optional_string_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(string)) => Some(string),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}
