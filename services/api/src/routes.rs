use crate::infra::{AppState, Workflows};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use chrono::Local;
use insurance_agent::error::AppError;
use insurance_agent::workflows::advice::{AdviceForm, AdviceRequest};
use insurance_agent::workflows::claims::lookup_claim;
use insurance_agent::workflows::premium::{premium_router, LocationProvider, PremiumService};
use insurance_agent::workflows::probability::{
    estimate_claim_probability, ProbabilityForm, RiskProfile,
};
use insurance_agent::workflows::renewal::{renewal_reminder, RenewalRequest};
use insurance_agent::workflows::session::Interaction;
use serde_json::{json, Value};
use std::sync::Arc;

pub(crate) fn with_insurance_routes<L>(
    premium: Arc<PremiumService<L>>,
    workflows: Workflows,
) -> axum::Router
where
    L: LocationProvider + 'static,
{
    premium_router(premium, workflows.history.clone())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/claims/:claim_id", get(claims_endpoint))
        .route("/api/v1/quote-advice", post(quote_advice_endpoint))
        .route("/api/v1/renewal", post(renewal_endpoint))
        .route(
            "/api/v1/claim-probability",
            post(claim_probability_endpoint),
        )
        .route("/api/v1/history", get(history_endpoint))
        .layer(Extension(workflows))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn claims_endpoint(
    Extension(workflows): Extension<Workflows>,
    Path(claim_id): Path<String>,
) -> Json<Value> {
    let lookup = lookup_claim(workflows.claims.as_ref(), &claim_id);
    let payload = json!(lookup);
    workflows.history.record(Interaction::new(
        "claims_lookup",
        format!("Claims Lookup for {}", claim_id.trim()),
        payload.clone(),
    ));
    Json(payload)
}

pub(crate) async fn quote_advice_endpoint(
    Extension(workflows): Extension<Workflows>,
    Json(form): Json<AdviceForm>,
) -> Result<Json<Value>, AppError> {
    let request = AdviceRequest::from_form(&form)?;
    let advice = workflows.advisor.advise(&request).await?;
    let payload = json!(advice);
    workflows.history.record(Interaction::new(
        "quote_advice",
        format!(
            "Quote + Advice with age={}, vehicle_type={}, coverage_amount={}",
            request.age, request.vehicle_type, request.coverage_amount
        ),
        payload.clone(),
    ));
    Ok(Json(payload))
}

pub(crate) async fn renewal_endpoint(
    Extension(workflows): Extension<Workflows>,
    Json(request): Json<RenewalRequest>,
) -> Result<Json<Value>, AppError> {
    let today = Local::now().date_naive();
    let reminder = renewal_reminder(&request, today)?;
    let payload = json!(reminder);
    workflows.history.record(Interaction::new(
        "policy_renewal",
        format!("Policy Renewal for {}", reminder.policy_id),
        payload.clone(),
    ));
    Ok(Json(payload))
}

pub(crate) async fn claim_probability_endpoint(
    Extension(workflows): Extension<Workflows>,
    Json(form): Json<ProbabilityForm>,
) -> Result<Json<Value>, AppError> {
    let profile = RiskProfile::from_form(&form)?;
    let estimate = estimate_claim_probability(&profile);
    let payload = json!(estimate);
    workflows.history.record(Interaction::new(
        "claim_probability",
        format!(
            "Claim Probability Estimator with age={}, vehicle_type={}, driving_history={}, annual_mileage={}",
            profile.age,
            profile.vehicle_type.label(),
            profile.driving_history.label(),
            profile.annual_mileage
        ),
        payload.clone(),
    ));
    Ok(Json(payload))
}

pub(crate) async fn history_endpoint(Extension(workflows): Extension<Workflows>) -> Json<Value> {
    Json(json!({ "history": workflows.history.entries() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use insurance_agent::workflows::advice::{AdviceError, QuoteAdvisor, TextGenerator};
    use insurance_agent::workflows::claims::ClaimsTable;
    use insurance_agent::workflows::premium::{FixedLocation, LocationSignal};
    use insurance_agent::workflows::session::InMemoryInteractionLog;
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate_text(&self, prompt: &str) -> Result<String, AdviceError> {
            Ok(format!("{} chars", prompt.len()))
        }
    }

    fn workflows() -> Workflows {
        Workflows {
            claims: Arc::new(ClaimsTable::built_in().expect("built-in claims")),
            advisor: Arc::new(QuoteAdvisor::new(Arc::new(EchoGenerator))),
            history: Arc::new(InMemoryInteractionLog::default()),
        }
    }

    fn app(workflows: Workflows) -> axum::Router {
        let premium = Arc::new(PremiumService::new(Arc::new(FixedLocation(
            LocationSignal::from_city("Chennai"),
        ))));
        with_insurance_routes(premium, workflows)
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn claims_endpoint_reports_status_and_misses() {
        let (status, body) = send(
            app(workflows()),
            Request::get("/api/v1/claims/C125")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], json!("found"));
        assert_eq!(body["status"], json!("Rejected"));

        let (status, body) = send(
            app(workflows()),
            Request::get("/api/v1/claims/C000")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], json!("not_found"));
    }

    #[tokio::test]
    async fn premium_endpoint_uses_configured_location() {
        let (status, body) = send(
            app(workflows()),
            post_json(
                "/api/v1/premium",
                json!({ "age": 30, "vehicle_type": "Sedan", "coverage_amount": 25000.0 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_city"], json!("Chennai"));
        assert_eq!(body["location_factor"], json!(1.2));
    }

    #[tokio::test]
    async fn quote_advice_endpoint_runs_chain() {
        let (status, body) = send(
            app(workflows()),
            post_json(
                "/api/v1/quote-advice",
                json!({ "age": 30, "vehicle_type": "SUV", "coverage_amount": 25000 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["quote"].as_str().expect("quote text").ends_with("chars"));
        assert!(body["advice"].is_string());
    }

    #[tokio::test]
    async fn quote_advice_endpoint_rejects_invalid_age() {
        let (status, body) = send(
            app(workflows()),
            post_json(
                "/api/v1/quote-advice",
                json!({ "age": 9, "vehicle_type": "SUV", "coverage_amount": 25000 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field"], json!("age"));
    }

    #[tokio::test]
    async fn renewal_endpoint_computes_days_left() {
        let expiry = Local::now().date_naive() + chrono::Duration::days(45);
        let (status, body) = send(
            app(workflows()),
            post_json(
                "/api/v1/renewal",
                json!({
                    "policy_id": "POL-9",
                    "expiry_date": expiry.format("%Y-%m-%d").to_string(),
                    "current_premium": 5000.0,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], json!("active"));
        assert_eq!(body["days_until_expiry"], json!(45));
    }

    #[tokio::test]
    async fn renewal_endpoint_rejects_bad_date() {
        let (status, _) = send(
            app(workflows()),
            post_json(
                "/api/v1/renewal",
                json!({
                    "policy_id": "POL-9",
                    "expiry_date": "next tuesday",
                    "current_premium": 5000.0,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn claim_probability_endpoint_scores_profile() {
        let (status, body) = send(
            app(workflows()),
            post_json(
                "/api/v1/claim-probability",
                json!({
                    "age": 22,
                    "vehicle_type": "Truck",
                    "driving_history": "major",
                    "annual_mileage": 16000,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk_score"], json!(10));
        assert_eq!(body["estimated_claim_probability"], json!("High (>30%)"));
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let workflows = workflows();
        let router = app(workflows.clone());

        for claim in ["C123", "C124"] {
            let _ = send(
                router.clone(),
                Request::get(format!("/api/v1/claims/{claim}"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await;
        }

        let (status, body) = send(
            router,
            Request::get("/api/v1/history")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let history = body["history"].as_array().expect("history array");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["query"], json!("Claims Lookup for C124"));
    }

    fn app_state() -> AppState {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn readiness_flips_once_flag_is_set() {
        let state = app_state();
        let router = app(workflows()).layer(Extension(state.clone()));

        let (status, body) = send(router.clone(), get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!("initializing"));

        state
            .readiness
            .store(true, std::sync::atomic::Ordering::Release);

        let (status, body) = send(router, get_request("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ready"));
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let router = app(workflows()).layer(Extension(app_state()));

        let response = router
            .oneshot(get_request("/metrics"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], json!("ok"));
    }
}
