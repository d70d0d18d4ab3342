use async_trait::async_trait;
use chrono::NaiveDate;
use insurance_agent::config::{AppConfig, GeoConfig, LlmConfig};
use insurance_agent::error::AppError;
use insurance_agent::workflows::advice::{
    AdviceError, ChatCompletionGenerator, QuoteAdvisor, TextGenerator, UnconfiguredGenerator,
};
use insurance_agent::workflows::claims::{ClaimsStore, ClaimsTable};
use insurance_agent::workflows::premium::{
    Coordinates, FixedLocation, HttpGeoEnricher, LocationProvider, LocationSignal, Unlocated,
};
use insurance_agent::workflows::session::{InMemoryInteractionLog, InteractionLog};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Collaborators shared by every request handler.
#[derive(Clone)]
pub(crate) struct Workflows {
    pub(crate) claims: Arc<dyn ClaimsStore>,
    pub(crate) advisor: Arc<QuoteAdvisor>,
    pub(crate) history: Arc<dyn InteractionLog>,
}

impl Workflows {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            claims: Arc::new(claims_table(config)?),
            advisor: Arc::new(QuoteAdvisor::new(text_generator(&config.llm)?)),
            history: Arc::new(InMemoryInteractionLog::with_limit(config.history.limit)),
        })
    }
}

pub(crate) fn claims_table(config: &AppConfig) -> Result<ClaimsTable, AppError> {
    let table = match &config.claims.table_path {
        Some(path) => {
            info!(path = %path.display(), "loading claims table");
            ClaimsTable::from_path(path)?
        }
        None => ClaimsTable::built_in()?,
    };
    Ok(table)
}

pub(crate) fn text_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, AppError> {
    match ChatCompletionGenerator::from_config(config) {
        Ok(generator) => Ok(Arc::new(generator)),
        Err(AdviceError::Unconfigured) => {
            warn!("LLM_API_KEY not set; quote advice will be unavailable");
            Ok(Arc::new(UnconfiguredGenerator))
        }
        Err(err) => Err(err.into()),
    }
}

/// Location source selected from config or CLI overrides.
pub(crate) enum GeoProvider {
    Http(HttpGeoEnricher),
    Fixed(FixedLocation),
    Offline(Unlocated),
}

impl GeoProvider {
    pub(crate) fn from_config(config: &GeoConfig) -> Result<Self, AppError> {
        if !config.enabled {
            info!("location enrichment disabled");
            return Ok(Self::Offline(Unlocated));
        }
        if config.reverse_api_key.is_none() {
            warn!("GEO_REVERSE_API_KEY not set; city lookup will be skipped");
        }
        Ok(Self::Http(HttpGeoEnricher::from_config(config)?))
    }
}

#[async_trait]
impl LocationProvider for GeoProvider {
    async fn locate(&self, hint: Option<Coordinates>) -> LocationSignal {
        match self {
            GeoProvider::Http(enricher) => enricher.locate(hint).await,
            GeoProvider::Fixed(fixed) => fixed.locate(hint).await,
            GeoProvider::Offline(offline) => offline.locate(hint).await,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
