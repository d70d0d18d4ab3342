use std::sync::Arc;

use super::calculator::{PremiumCalculator, RiskBreakdown};
use super::domain::QuoteRequest;
use super::geo::LocationProvider;
use super::validator::{InputValidator, QuoteForm, ValidationError};

/// Service composing validation, location enrichment, and pricing.
pub struct PremiumService<L> {
    validator: InputValidator,
    locations: Arc<L>,
    calculator: PremiumCalculator,
}

impl<L> PremiumService<L>
where
    L: LocationProvider + 'static,
{
    pub fn new(locations: Arc<L>) -> Self {
        Self {
            validator: InputValidator,
            locations,
            calculator: PremiumCalculator::new(),
        }
    }

    /// Price an already validated request. Location lookup never fails the call.
    pub async fn compute_premium(&self, request: &QuoteRequest) -> RiskBreakdown {
        let location = self.locations.locate(request.coordinates).await;
        self.calculator.compute(request, &location)
    }

    /// Validate a raw form and price it; nothing is looked up for invalid input.
    pub async fn quote(&self, form: &QuoteForm) -> Result<RiskBreakdown, ValidationError> {
        let request = self.validator.validate(form)?;
        Ok(self.compute_premium(&request).await)
    }
}
