use crate::infra::{claims_table, parse_date, text_generator, GeoProvider};
use chrono::{Local, NaiveDate};
use clap::Args;
use insurance_agent::config::AppConfig;
use insurance_agent::error::AppError;
use insurance_agent::telemetry;
use insurance_agent::workflows::advice::{AdviceError, AdviceForm, AdviceRequest, QuoteAdvisor};
use insurance_agent::workflows::claims::lookup_claim;
use insurance_agent::workflows::premium::{
    FixedLocation, LocationSignal, PremiumService, QuoteForm, RiskBreakdown, Unlocated,
};
use insurance_agent::workflows::probability::{
    estimate_claim_probability, ClaimProbability, ProbabilityForm, RiskProfile,
};
use insurance_agent::workflows::renewal::{renewal_reminder, RenewalReminder, RenewalRequest};
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct PremiumArgs {
    /// Driver age in years (16-100)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) age: i64,
    /// sedan, suv, truck or anything else
    #[arg(long)]
    pub(crate) vehicle_type: String,
    /// Requested coverage amount
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) coverage_amount: f64,
    /// clean, minor or major (defaults to clean)
    #[arg(long)]
    pub(crate) driving_history: Option<String>,
    /// Latitude to reverse-geocode instead of looking up the caller's IP
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub(crate) lat: Option<f64>,
    /// Longitude to reverse-geocode instead of looking up the caller's IP
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub(crate) lon: Option<f64>,
    /// Skip geolocation and price as if located in this city
    #[arg(long, conflicts_with = "offline")]
    pub(crate) city: Option<String>,
    /// Skip geolocation entirely
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ClaimsArgs {
    /// Claim identifier, e.g. C123
    pub(crate) claim_id: String,
}

#[derive(Args, Debug)]
pub(crate) struct RenewalArgs {
    #[arg(long)]
    pub(crate) policy_id: String,
    /// Policy expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) expiry_date: String,
    #[arg(long)]
    pub(crate) current_premium: f64,
    /// Override the evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ProbabilityArgs {
    #[arg(long)]
    pub(crate) age: i64,
    #[arg(long)]
    pub(crate) vehicle_type: String,
    #[arg(long)]
    pub(crate) driving_history: String,
    /// Annual mileage (1000-100000)
    #[arg(long)]
    pub(crate) annual_mileage: i64,
}

#[derive(Args, Debug)]
pub(crate) struct AdviceArgs {
    #[arg(long)]
    pub(crate) age: i64,
    #[arg(long)]
    pub(crate) vehicle_type: String,
    #[arg(long)]
    pub(crate) coverage_amount: f64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip geolocation in the premium portion of the demo
    #[arg(long)]
    pub(crate) offline: bool,
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn premium_form(args: &PremiumArgs) -> QuoteForm {
    let mut form = QuoteForm::new()
        .with("age", args.age)
        .with("vehicle_type", args.vehicle_type.as_str())
        .with("coverage_amount", args.coverage_amount);
    if let Some(history) = &args.driving_history {
        form = form.with("driving_history", history.as_str());
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        form = form.with("lat", lat).with("lon", lon);
    }
    form
}

fn location_provider(args: &PremiumArgs, config: &AppConfig) -> Result<GeoProvider, AppError> {
    if args.offline {
        return Ok(GeoProvider::Offline(Unlocated));
    }
    if let Some(city) = &args.city {
        return Ok(GeoProvider::Fixed(FixedLocation(LocationSignal::from_city(
            city.as_str(),
        ))));
    }
    GeoProvider::from_config(&config.geo)
}

pub(crate) async fn run_premium(args: PremiumArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let service = PremiumService::new(Arc::new(location_provider(&args, &config)?));
    let breakdown = service.quote(&premium_form(&args)).await?;
    render_premium(&breakdown);
    Ok(())
}

pub(crate) fn run_claims(args: ClaimsArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let table = claims_table(&config)?;
    println!("{}", lookup_claim(&table, &args.claim_id).message());
    Ok(())
}

pub(crate) fn run_renewal(args: RenewalArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let request = RenewalRequest {
        policy_id: args.policy_id,
        expiry_date: args.expiry_date,
        current_premium: args.current_premium,
    };
    render_renewal(&renewal_reminder(&request, today)?);
    Ok(())
}

pub(crate) fn run_probability(args: ProbabilityArgs) -> Result<(), AppError> {
    let form = ProbabilityForm {
        age: Some(json!(args.age)),
        vehicle_type: Some(json!(args.vehicle_type)),
        driving_history: Some(json!(args.driving_history)),
        annual_mileage: Some(json!(args.annual_mileage)),
    };
    let profile = RiskProfile::from_form(&form)?;
    render_probability(&estimate_claim_probability(&profile));
    Ok(())
}

pub(crate) async fn run_advice(args: AdviceArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let request = AdviceRequest::from_form(&AdviceForm {
        age: Some(json!(args.age)),
        vehicle_type: Some(json!(args.vehicle_type)),
        coverage_amount: Some(json!(args.coverage_amount)),
    })?;
    let advisor = QuoteAdvisor::new(text_generator(&config.llm)?);
    let advice = advisor.advise(&request).await?;
    println!("Estimated quote:\n{}\n", advice.quote);
    println!("Advice:\n{}", advice.advice);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let today = Local::now().date_naive();

    println!("Smart insurance agent demo");

    println!("\nPremium calculator (age 30, SUV, minor history, 25000 coverage)");
    let locations = if args.offline {
        GeoProvider::Offline(Unlocated)
    } else {
        GeoProvider::from_config(&config.geo)?
    };
    let service = PremiumService::new(Arc::new(locations));
    let form = QuoteForm::new()
        .with("age", 30)
        .with("vehicle_type", "SUV")
        .with("coverage_amount", 25_000)
        .with("driving_history", "Minor (1-2 incident reports)");
    render_premium(&service.quote(&form).await?);

    println!("\nClaims lookup");
    let table = claims_table(&config)?;
    for claim_id in ["C123", "C999"] {
        println!("{}", lookup_claim(&table, claim_id).message());
    }

    println!("\nPolicy renewal (expires in 20 days)");
    let request = RenewalRequest {
        policy_id: "POL-1001".to_string(),
        expiry_date: (today + chrono::Duration::days(20))
            .format("%Y-%m-%d")
            .to_string(),
        current_premium: 5_000.0,
    };
    render_renewal(&renewal_reminder(&request, today)?);

    println!("\nClaim probability (age 22, truck, major history, 16000 miles)");
    let form = ProbabilityForm {
        age: Some(json!(22)),
        vehicle_type: Some(json!("Truck")),
        driving_history: Some(json!("Major (3+ incidents or DUI)")),
        annual_mileage: Some(json!(16_000)),
    };
    render_probability(&estimate_claim_probability(&RiskProfile::from_form(&form)?));

    println!("\nQuote advice");
    let advisor = QuoteAdvisor::new(text_generator(&config.llm)?);
    let request = AdviceRequest {
        age: 30,
        vehicle_type: "SUV".to_string(),
        coverage_amount: 25_000.0,
    };
    match advisor.advise(&request).await {
        Ok(advice) => {
            println!("Estimated quote:\n{}\n", advice.quote);
            println!("Advice:\n{}", advice.advice);
        }
        Err(AdviceError::Unconfigured) => {
            println!("- skipped: set LLM_API_KEY to enable quote advice");
        }
        Err(err) => println!("- unavailable: {err}"),
    }

    Ok(())
}

fn render_premium(breakdown: &RiskBreakdown) {
    let city = if breakdown.location_city.is_empty() {
        "unresolved"
    } else {
        breakdown.location_city.as_str()
    };
    println!("- Location: {city}");
    println!(
        "- Factors: age {:.3} | vehicle {:.2} | history {:.2} | location {:.2}",
        breakdown.age_factor,
        breakdown.vehicle_factor,
        breakdown.history_factor,
        breakdown.location_factor
    );
    println!(
        "- Base premium {:.2} | coverage {:.2}",
        breakdown.base_premium, breakdown.coverage_amount
    );
    println!("- Estimated premium: {:.2}", breakdown.final_premium);
}

fn render_renewal(reminder: &RenewalReminder) {
    println!(
        "- Policy {}: {} days until expiry | current premium {:.2}",
        reminder.policy_id, reminder.days_until_expiry, reminder.current_premium
    );
    println!("- {}", reminder.recommendation);
}

fn render_probability(estimate: &ClaimProbability) {
    println!(
        "- Risk score {} | estimated claim probability {}",
        estimate.risk_score, estimate.estimated_claim_probability
    );
    println!("- {}", estimate.insights);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PremiumArgs {
        PremiumArgs {
            age: 30,
            vehicle_type: "suv".to_string(),
            coverage_amount: 25_000.0,
            driving_history: None,
            lat: None,
            lon: None,
            city: None,
            offline: true,
        }
    }

    #[tokio::test]
    async fn premium_form_runs_through_validator() {
        let mut args = args();
        args.driving_history = Some("minor".to_string());
        let service = PremiumService::new(Arc::new(Unlocated));

        let breakdown = service.quote(&premium_form(&args)).await.expect("valid");

        assert_eq!(breakdown.vehicle_factor, 1.2);
        assert_eq!(breakdown.history_factor, 1.15);
        assert_eq!(breakdown.location_factor, 1.0);
    }

    #[test]
    fn premium_form_carries_coordinates() {
        let mut args = args();
        args.lat = Some(19.076);
        args.lon = Some(72.8777);

        let form = premium_form(&args);

        assert_eq!(form.field("lat"), Some(&json!(19.076)));
        assert_eq!(form.field("lon"), Some(&json!(72.8777)));
        assert!(form.field("driving_history").is_none());
    }

    #[tokio::test]
    async fn out_of_range_age_is_rejected() {
        let mut args = args();
        args.age = 12;
        let service = PremiumService::new(Arc::new(Unlocated));

        let err = service
            .quote(&premium_form(&args))
            .await
            .expect_err("too young");

        assert_eq!(err.field(), "age");
    }
}
