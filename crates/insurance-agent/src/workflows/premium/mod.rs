//! Premium pricing: validation, location enrichment, risk scoring, and the
//! final premium formula.
//!
//! Data flows `InputValidator -> LocationProvider -> RiskScorer ->
//! PremiumCalculator`. Only the location step touches the network and it
//! degrades to an empty signal instead of failing.

pub mod calculator;
pub mod domain;
pub mod geo;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validator;

#[cfg(test)]
mod tests;

pub use calculator::{PremiumCalculator, RiskBreakdown, BASE_PREMIUM};
pub use domain::{Coordinates, DrivingHistory, LocationSignal, QuoteRequest, VehicleType};
pub use geo::{FixedLocation, GeoLookupError, HttpGeoEnricher, LocationProvider, Unlocated};
pub use router::premium_router;
pub use scoring::{RiskFactors, RiskScorer, HIGH_RISK_CITIES};
pub use service::PremiumService;
pub use validator::{InputValidator, QuoteForm, ValidationError};
