use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::geo::LocationProvider;
use super::service::PremiumService;
use super::validator::QuoteForm;
use crate::workflows::session::{Interaction, InteractionLog};

pub(crate) struct PremiumRouteState<L> {
    service: Arc<PremiumService<L>>,
    history: Arc<dyn InteractionLog>,
}

impl<L> Clone for PremiumRouteState<L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            history: Arc::clone(&self.history),
        }
    }
}

/// Router builder exposing the premium calculator over HTTP.
pub fn premium_router<L>(
    service: Arc<PremiumService<L>>,
    history: Arc<dyn InteractionLog>,
) -> Router
where
    L: LocationProvider + 'static,
{
    Router::new()
        .route("/api/v1/premium", post(premium_handler::<L>))
        .with_state(PremiumRouteState { service, history })
}

pub(crate) async fn premium_handler<L>(
    State(state): State<PremiumRouteState<L>>,
    axum::Json(form): axum::Json<QuoteForm>,
) -> Response
where
    L: LocationProvider + 'static,
{
    let query = format!(
        "Premium Calculator with {}",
        serde_json::to_string(&form).unwrap_or_default()
    );

    match state.service.quote(&form).await {
        Ok(breakdown) => {
            let payload = json!(breakdown);
            state
                .history
                .record(Interaction::new("premium_calculator", query, payload.clone()));
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            state
                .history
                .record(Interaction::new("premium_calculator", query, payload.clone()));
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
