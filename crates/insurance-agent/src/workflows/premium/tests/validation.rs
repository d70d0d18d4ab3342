use serde_json::{json, Value};

use super::common::*;
use crate::workflows::premium::calculator::{max_coverage_amount, PremiumCalculator};
use crate::workflows::premium::domain::{Coordinates, DrivingHistory, VehicleType};
use crate::workflows::premium::validator::{InputValidator, QuoteForm, ValidationError};

#[test]
fn validator_normalizes_case_and_form_labels() {
    let form = QuoteForm::new()
        .with("age", json!("42"))
        .with("vehicle_type", json!("  SUV "))
        .with("coverage_amount", json!("30000.50"))
        .with("driving_history", json!("Minor (1-2 incident reports)"));

    let request = InputValidator.validate(&form).expect("form is valid");

    assert_eq!(request.age, 42);
    assert_eq!(request.vehicle_type, VehicleType::Suv);
    assert_eq!(request.driving_history, DrivingHistory::Minor);
    assert_close(request.coverage_amount, 30_000.5);
    assert!(request.coordinates.is_none());
}

#[test]
fn unknown_categories_are_tolerated() {
    let request = InputValidator
        .validate(&form(30, "hovercraft", 25_000.0, "unremarkable"))
        .expect("free text never fails validation");

    assert_eq!(request.vehicle_type, VehicleType::Other);
    assert_eq!(request.driving_history, DrivingHistory::Other);
}

#[test]
fn missing_driving_history_defaults_to_clean() {
    let form = QuoteForm::new()
        .with("age", json!(30))
        .with("vehicle_type", json!("sedan"))
        .with("coverage_amount", json!(25_000));

    let request = InputValidator.validate(&form).expect("form is valid");

    assert_eq!(request.driving_history, DrivingHistory::Clean);
}

#[test]
fn age_outside_range_names_field_and_bounds() {
    for age in [15, 101] {
        let err = InputValidator
            .validate(&form(age, "sedan", 25_000.0, "clean"))
            .expect_err("age rejected");

        assert_eq!(err.field(), "age");
        match err {
            ValidationError::OutOfRange { min, max, .. } => {
                assert_eq!(min, 16.0);
                assert_eq!(max, 100.0);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }
}

#[test]
fn age_boundaries_are_inclusive() {
    for age in [16, 100] {
        let request = InputValidator
            .validate(&form(age, "sedan", 25_000.0, "clean"))
            .expect("boundary accepted");
        assert_eq!(i64::from(request.age), age);
    }
}

#[test]
fn fractional_age_is_rejected() {
    let form = form(30, "sedan", 25_000.0, "clean").with("age", json!(30.5));

    let err = InputValidator.validate(&form).expect_err("fractional age");

    assert!(matches!(err, ValidationError::NotAnInteger { field: "age", .. }));
}

#[test]
fn coverage_must_be_positive_number() {
    let zero = form(30, "sedan", 0.0, "clean");
    let err = InputValidator.validate(&zero).expect_err("zero coverage");
    assert!(matches!(
        err,
        ValidationError::NotPositive {
            field: "coverage_amount",
            ..
        }
    ));

    let text = zero.with("coverage_amount", json!("a lot"));
    let err = InputValidator.validate(&text).expect_err("text coverage");
    assert_eq!(err.field(), "coverage_amount");
    assert!(err.to_string().contains("a lot"));
}

#[test]
fn coverage_too_large_to_price_is_rejected() {
    let huge = form(100, "truck", 1e305, "major");
    let err = InputValidator.validate(&huge).expect_err("premium would overflow");
    match err {
        ValidationError::OutOfRange {
            field: "coverage_amount",
            max,
            found,
            ..
        } => {
            assert_eq!(max, max_coverage_amount());
            assert_eq!(found, 1e305);
        }
        other => panic!("expected out of range, got {other:?}"),
    }

    let ceiling = form(100, "truck", max_coverage_amount(), "major");
    let request = InputValidator.validate(&ceiling).expect("ceiling accepted");
    let breakdown = PremiumCalculator::new().compute(&request, &mumbai());
    assert!(breakdown.final_premium.is_finite());
    assert!(serde_json::to_value(&breakdown).expect("serializes")["final_premium"].is_f64());
}

#[test]
fn missing_required_fields_are_reported() {
    let form = QuoteForm::new()
        .with("age", json!(30))
        .with("coverage_amount", json!(25_000))
        .with("vehicle_type", Value::Null);

    let err = InputValidator.validate(&form).expect_err("vehicle missing");

    assert_eq!(
        err,
        ValidationError::Missing {
            field: "vehicle_type"
        }
    );
}

#[test]
fn coordinates_are_parsed_and_bounded() {
    let located = form(30, "sedan", 25_000.0, "clean")
        .with("lat", json!(28.6139))
        .with("lon", json!("77.2090"));
    let request = InputValidator.validate(&located).expect("coordinates valid");
    assert_eq!(
        request.coordinates,
        Some(Coordinates {
            latitude: 28.6139,
            longitude: 77.209,
        })
    );

    let half = form(30, "sedan", 25_000.0, "clean").with("lat", json!(28.6));
    assert_eq!(
        InputValidator.validate(&half).expect_err("lon missing"),
        ValidationError::IncompleteCoordinates { field: "lon" }
    );

    let other_half = form(30, "sedan", 25_000.0, "clean").with("longitude", json!(77.2));
    let err = InputValidator
        .validate(&other_half)
        .expect_err("lat missing");
    assert_eq!(err.field(), "lat");

    let nulls = form(30, "sedan", 25_000.0, "clean")
        .with("lat", Value::Null)
        .with("lon", Value::Null);
    let request = InputValidator.validate(&nulls).expect("null coordinates allowed");
    assert!(request.coordinates.is_none());

    let far = form(30, "sedan", 25_000.0, "clean")
        .with("lat", json!(91.0))
        .with("lon", json!(0.0));
    let err = InputValidator.validate(&far).expect_err("latitude out of range");
    assert_eq!(err.field(), "lat");
}
