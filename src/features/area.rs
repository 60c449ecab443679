//! Area normalization.
//!
//! Listings quote their built-up area in many shapes: a plain number, a
//! range such as `"1000 - 1200"`, or a value in one of several regional
//! units (`"34.46Sq. Meter"`, `"2Acres"`). Everything is reduced to square
//! feet here.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Regional units and their square-foot conversion factors, in match order.
pub const UNIT_FACTORS: [(&str, f64); 7] = [
    ("Sq. Meter", 10.7639),
    ("Acres", 43560.0),
    ("Sq. Yards", 9.0),
    ("Cents", 435.6),
    ("Guntha", 1089.0),
    ("Perch", 272.25),
    ("Grounds", 2400.0),
];

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("number pattern is valid"));

/// Raw `total_sqft` value as it arrives in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaInput {
    Number(f64),
    Text(String),
}

impl TryFrom<&Value> for AreaInput {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(AreaInput::Number)
                .ok_or_else(|| Error::normalization(format!("unrepresentable number {n}"))),
            Value::String(s) => Ok(AreaInput::Text(s.clone())),
            other => Err(Error::normalization(format!(
                "expected a number or a string, got {other}"
            ))),
        }
    }
}

impl From<f64> for AreaInput {
    fn from(value: f64) -> Self {
        AreaInput::Number(value)
    }
}

impl From<&str> for AreaInput {
    fn from(value: &str) -> Self {
        AreaInput::Text(value.to_string())
    }
}

/// Converts a raw area into square feet.
///
/// Strategies are tried in a fixed order: numeric passthrough, two-sided
/// range, plain float, unit suffix, then the first number found anywhere in
/// the text. The last one does no unit conversion at all.
pub fn normalize_area(raw: &AreaInput) -> Result<f64> {
    let value = match raw {
        AreaInput::Number(n) => *n,
        AreaInput::Text(text) => normalize_text(text)?,
    };

    if value.is_nan() {
        return Err(Error::normalization("area is not a number"));
    }
    Ok(value)
}

fn normalize_text(text: &str) -> Result<f64> {
    if let Some(mean) = parse_range(text) {
        return Ok(mean);
    }

    if let Some(value) = parse_float(text) {
        return Ok(value);
    }

    for (unit, factor) in UNIT_FACTORS {
        if text.contains(unit) {
            let quantity = text.replace(unit, "");
            return parse_float(&quantity)
                .map(|value| value * factor)
                .ok_or_else(|| {
                    Error::normalization(format!("cannot read a quantity of {unit} from {text:?}"))
                });
        }
    }

    NUMBER_PATTERN
        .find(text)
        .and_then(|m| parse_float(m.as_str()))
        .ok_or_else(|| Error::normalization(format!("no numeric value in {text:?}")))
}

fn parse_range(text: &str) -> Option<f64> {
    let mut bounds = text.split('-');
    let (low, high) = (bounds.next()?, bounds.next()?);
    if bounds.next().is_some() {
        return None;
    }
    Some((parse_float(low)? + parse_float(high)?) / 2.0)
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
