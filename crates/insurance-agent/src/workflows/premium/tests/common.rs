use serde_json::json;

use crate::workflows::premium::domain::{DrivingHistory, LocationSignal, QuoteRequest, VehicleType};
use crate::workflows::premium::validator::QuoteForm;

pub(super) fn form(age: i64, vehicle_type: &str, coverage: f64, history: &str) -> QuoteForm {
    QuoteForm::new()
        .with("age", json!(age))
        .with("vehicle_type", json!(vehicle_type))
        .with("coverage_amount", json!(coverage))
        .with("driving_history", json!(history))
}

pub(super) fn request(
    age: u8,
    vehicle_type: VehicleType,
    driving_history: DrivingHistory,
) -> QuoteRequest {
    QuoteRequest {
        age,
        vehicle_type,
        coverage_amount: 25_000.0,
        driving_history,
        coordinates: None,
    }
}

pub(super) fn mumbai() -> LocationSignal {
    LocationSignal {
        latitude: Some(19.076),
        longitude: Some(72.8777),
        city: Some("Mumbai".to_string()),
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
