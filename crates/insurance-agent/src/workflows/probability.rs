//! Additive claim-likelihood score for the next policy year.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::premium::validator::{parse_age, parse_integer, text_of, ValidationError};
use super::premium::{DrivingHistory, VehicleType};

pub const MIN_ANNUAL_MILEAGE: i64 = 1_000;
pub const MAX_ANNUAL_MILEAGE: i64 = 100_000;

const INSIGHTS: &str = "Reduce mileage and maintain clean driving to lower risk.";

/// Raw estimator input as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbabilityForm {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub vehicle_type: Option<Value>,
    #[serde(default)]
    pub driving_history: Option<Value>,
    #[serde(default)]
    pub annual_mileage: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    pub age: u8,
    pub vehicle_type: VehicleType,
    pub driving_history: DrivingHistory,
    pub annual_mileage: u32,
}

impl RiskProfile {
    pub fn from_form(form: &ProbabilityForm) -> Result<Self, ValidationError> {
        let age = parse_age(form.age.as_ref().filter(|value| !value.is_null()))?;
        let vehicle_type = category(&form.vehicle_type, "vehicle_type", VehicleType::from_label)?;
        let driving_history = category(
            &form.driving_history,
            "driving_history",
            DrivingHistory::from_label,
        )?;

        let mileage = parse_integer(
            "annual_mileage",
            form.annual_mileage.as_ref().filter(|value| !value.is_null()),
        )?;
        if !(MIN_ANNUAL_MILEAGE..=MAX_ANNUAL_MILEAGE).contains(&mileage) {
            return Err(ValidationError::OutOfRange {
                field: "annual_mileage",
                min: MIN_ANNUAL_MILEAGE as f64,
                max: MAX_ANNUAL_MILEAGE as f64,
                found: mileage as f64,
            });
        }

        Ok(Self {
            age,
            vehicle_type,
            driving_history,
            annual_mileage: mileage as u32,
        })
    }
}

fn category<T>(
    value: &Option<Value>,
    field: &'static str,
    parse: fn(&str) -> T,
) -> Result<T, ValidationError> {
    value
        .as_ref()
        .filter(|value| !value.is_null())
        .map(|value| parse(&text_of(value)))
        .ok_or(ValidationError::Missing { field })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimRiskBand {
    Low,
    Medium,
    High,
}

impl ClaimRiskBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Low,
            4..=6 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low (<15%)",
            Self::Medium => "Medium (15-30%)",
            Self::High => "High (>30%)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimProbability {
    pub risk_score: u8,
    pub band: ClaimRiskBand,
    pub estimated_claim_probability: &'static str,
    pub insights: &'static str,
}

pub fn estimate_claim_probability(profile: &RiskProfile) -> ClaimProbability {
    let age_points = if profile.age < 25 {
        2
    } else if profile.age > 60 {
        1
    } else {
        0
    };

    let vehicle_points = match profile.vehicle_type {
        VehicleType::Sedan | VehicleType::Other => 1,
        VehicleType::Suv => 2,
        VehicleType::Truck => 3,
    };

    let history_points = match profile.driving_history {
        DrivingHistory::Clean => 0,
        DrivingHistory::Other => 1,
        DrivingHistory::Minor => 2,
        DrivingHistory::Major => 3,
    };

    let mileage_points = if profile.annual_mileage > 15_000 {
        2
    } else if profile.annual_mileage > 10_000 {
        1
    } else {
        0
    };

    let risk_score = age_points + vehicle_points + history_points + mileage_points;
    let band = ClaimRiskBand::for_score(risk_score);

    ClaimProbability {
        risk_score,
        band,
        estimated_claim_probability: band.label(),
        insights: INSIGHTS,
    }
}
