use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::calculator::max_coverage_amount;
use super::domain::{Coordinates, DrivingHistory, QuoteRequest, VehicleType};

pub const MIN_AGE: i64 = 16;
pub const MAX_AGE: i64 = 100;

/// Raw form fields keyed by name, exactly as the caller submitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteForm(pub BTreeMap<String, Value>);

impl QuoteForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Looks up a field, treating JSON `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }
}

/// Malformed form input. Each variant names the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a whole number (found {found})")]
    NotAnInteger { field: &'static str, found: String },
    #[error("{field} must be a number (found {found})")]
    NotANumber { field: &'static str, found: String },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} must be greater than zero (found {found})")]
    NotPositive { field: &'static str, found: f64 },
    #[error("{field} is required when the other coordinate is supplied")]
    IncompleteCoordinates { field: &'static str },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotAnInteger { field, .. }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::IncompleteCoordinates { field } => field,
        }
    }
}

/// Normalizes raw quote forms into typed requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn validate(&self, form: &QuoteForm) -> Result<QuoteRequest, ValidationError> {
        let age = parse_age(form.field("age"))?;
        let coverage_amount = parse_coverage(form.field("coverage_amount"))?;

        let vehicle_type = form
            .field("vehicle_type")
            .map(|value| VehicleType::from_label(&text_of(value)))
            .ok_or(ValidationError::Missing {
                field: "vehicle_type",
            })?;

        let driving_history = form
            .field("driving_history")
            .map(|value| DrivingHistory::from_label(&text_of(value)))
            .unwrap_or(DrivingHistory::Clean);

        let coordinates = parse_coordinates(form)?;

        Ok(QuoteRequest {
            age,
            vehicle_type,
            coverage_amount,
            driving_history,
            coordinates,
        })
    }
}

pub fn parse_age(value: Option<&Value>) -> Result<u8, ValidationError> {
    let age = parse_integer("age", value)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::OutOfRange {
            field: "age",
            min: MIN_AGE as f64,
            max: MAX_AGE as f64,
            found: age as f64,
        });
    }
    Ok(age as u8)
}

pub fn parse_coverage(value: Option<&Value>) -> Result<f64, ValidationError> {
    let amount = parse_decimal("coverage_amount", value)?;
    if amount <= 0.0 {
        return Err(ValidationError::NotPositive {
            field: "coverage_amount",
            found: amount,
        });
    }
    let ceiling = max_coverage_amount();
    if amount > ceiling {
        return Err(ValidationError::OutOfRange {
            field: "coverage_amount",
            min: 0.0,
            max: ceiling,
            found: amount,
        });
    }
    Ok(amount)
}

pub(crate) fn parse_integer(
    field: &'static str,
    value: Option<&Value>,
) -> Result<i64, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;
    let not_integer = || ValidationError::NotAnInteger {
        field,
        found: text_of(value),
    };

    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                    .map(|float| float as i64)
            })
            .ok_or_else(not_integer),
        Value::String(raw) => raw.trim().parse::<i64>().map_err(|_| not_integer()),
        _ => Err(not_integer()),
    }
}

pub(crate) fn parse_decimal(
    field: &'static str,
    value: Option<&Value>,
) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|number| number.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            found: text_of(value),
        })
}

fn parse_coordinates(form: &QuoteForm) -> Result<Option<Coordinates>, ValidationError> {
    let latitude = form.field("lat").or_else(|| form.field("latitude"));
    let longitude = form.field("lon").or_else(|| form.field("longitude"));

    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(latitude), Some(longitude)) => {
            let latitude = bounded("lat", parse_decimal("lat", Some(latitude))?, 90.0)?;
            let longitude = bounded("lon", parse_decimal("lon", Some(longitude))?, 180.0)?;
            Ok(Some(Coordinates {
                latitude,
                longitude,
            }))
        }
        (Some(_), None) => Err(ValidationError::IncompleteCoordinates { field: "lon" }),
        (None, Some(_)) => Err(ValidationError::IncompleteCoordinates { field: "lat" }),
    }
}

fn bounded(field: &'static str, value: f64, limit: f64) -> Result<f64, ValidationError> {
    if value.abs() > limit {
        return Err(ValidationError::OutOfRange {
            field,
            min: -limit,
            max: limit,
            found: value,
        });
    }
    Ok(value)
}

pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}
