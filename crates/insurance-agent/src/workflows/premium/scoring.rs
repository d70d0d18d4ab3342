use serde::{Deserialize, Serialize};

use super::domain::{DrivingHistory, LocationSignal, QuoteRequest, VehicleType};
use super::validator::MAX_AGE;

/// Metropolitan areas carrying the elevated location factor.
pub const HIGH_RISK_CITIES: [&str; 20] = [
    "Delhi",
    "Mumbai",
    "Gurgaon",
    "Bangalore",
    "Chennai",
    "Kolkata",
    "Hyderabad",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "New Delhi",
    "Noida",
    "Ghaziabad",
    "Faridabad",
    "Lucknow",
    "Kanpur",
    "Nagpur",
    "Indore",
    "Bhopal",
    "Coimbatore",
];

const AGE_FACTOR_THRESHOLD: u8 = 25;
const AGE_FACTOR_STEP: f64 = 0.015;
const HIGH_RISK_LOCATION_FACTOR: f64 = 1.2;
const NEUTRAL_FACTOR: f64 = 1.0;
const UNRECOGNIZED_FACTOR: f64 = 1.1;

/// The four multiplicative adjustments applied to the base premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age_factor: f64,
    pub vehicle_factor: f64,
    pub history_factor: f64,
    pub location_factor: f64,
}

/// Stateless scorer; total over every validated request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn score(&self, request: &QuoteRequest, location: &LocationSignal) -> RiskFactors {
        RiskFactors {
            age_factor: age_factor(request.age),
            vehicle_factor: vehicle_factor(request.vehicle_type),
            history_factor: history_factor(request.driving_history),
            location_factor: location_factor(location.resolved_city()),
        }
    }
}

/// Flat up to 25, then 1.5% per additional year.
pub fn age_factor(age: u8) -> f64 {
    let years_over = age.saturating_sub(AGE_FACTOR_THRESHOLD);
    1.0 + f64::from(years_over) * AGE_FACTOR_STEP
}

pub fn vehicle_factor(vehicle_type: VehicleType) -> f64 {
    match vehicle_type {
        VehicleType::Sedan => NEUTRAL_FACTOR,
        VehicleType::Suv => 1.2,
        VehicleType::Truck => 1.4,
        VehicleType::Other => UNRECOGNIZED_FACTOR,
    }
}

pub fn history_factor(history: DrivingHistory) -> f64 {
    match history {
        DrivingHistory::Clean => NEUTRAL_FACTOR,
        DrivingHistory::Minor => 1.15,
        DrivingHistory::Major => 1.3,
        DrivingHistory::Other => UNRECOGNIZED_FACTOR,
    }
}

/// Largest value the four factors can multiply out to.
pub fn max_factor_product() -> f64 {
    age_factor(MAX_AGE as u8)
        * vehicle_factor(VehicleType::Truck)
        * history_factor(DrivingHistory::Major)
        * HIGH_RISK_LOCATION_FACTOR
}

pub fn location_factor(city: Option<&str>) -> f64 {
    match city {
        Some(city) if is_high_risk_city(city) => HIGH_RISK_LOCATION_FACTOR,
        _ => NEUTRAL_FACTOR,
    }
}

/// Membership check against the geocoded city, ignoring case and padding.
pub fn is_high_risk_city(city: &str) -> bool {
    let city = city.trim();
    HIGH_RISK_CITIES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(city))
}
