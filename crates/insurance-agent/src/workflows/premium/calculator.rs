use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{LocationSignal, QuoteRequest};
use super::scoring::{max_factor_product, RiskFactors, RiskScorer};

pub const BASE_PREMIUM: f64 = 500.0;
const COVERAGE_UNIT: f64 = 10_000.0;

/// Largest coverage for which the worst-case premium stays finite through
/// the factor product and cent rounding.
pub fn max_coverage_amount() -> f64 {
    f64::MAX / (BASE_PREMIUM * max_factor_product() * 100.0)
}

/// Auditable premium result; every intermediate factor is echoed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub base_premium: f64,
    pub age_factor: f64,
    pub vehicle_factor: f64,
    pub history_factor: f64,
    pub location_factor: f64,
    pub location_city: String,
    pub coverage_amount: f64,
    pub final_premium: f64,
}

impl RiskBreakdown {
    pub fn factors(&self) -> RiskFactors {
        RiskFactors {
            age_factor: self.age_factor,
            vehicle_factor: self.vehicle_factor,
            history_factor: self.history_factor,
            location_factor: self.location_factor,
        }
    }

    /// Recomputes the premium from the echoed fields alone.
    pub fn recombined_premium(&self) -> f64 {
        premium_from(self.base_premium, &self.factors(), self.coverage_amount)
    }
}

/// Composes the risk factors into the final premium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumCalculator {
    scorer: RiskScorer,
}

impl PremiumCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(&self, request: &QuoteRequest, location: &LocationSignal) -> RiskBreakdown {
        let factors = self.scorer.score(request, location);
        let final_premium = premium_from(BASE_PREMIUM, &factors, request.coverage_amount);
        let location_city = location.resolved_city().unwrap_or_default().to_string();

        info!(
            age = request.age,
            vehicle = request.vehicle_type.label(),
            history = request.driving_history.label(),
            city = %location_city,
            final_premium,
            "premium computed"
        );

        RiskBreakdown {
            base_premium: BASE_PREMIUM,
            age_factor: factors.age_factor,
            vehicle_factor: factors.vehicle_factor,
            history_factor: factors.history_factor,
            location_factor: factors.location_factor,
            location_city,
            coverage_amount: request.coverage_amount,
            final_premium,
        }
    }
}

fn premium_from(base: f64, factors: &RiskFactors, coverage_amount: f64) -> f64 {
    let premium = base
        * factors.age_factor
        * factors.vehicle_factor
        * factors.history_factor
        * factors.location_factor
        * coverage_amount
        / COVERAGE_UNIT;
    round_cents(premium)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
