use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::advice::AdviceError;
use crate::workflows::claims::ClaimsTableError;
use crate::workflows::premium::ValidationError;
use crate::workflows::renewal::RenewalError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    HttpClient(reqwest::Error),
    Validation(ValidationError),
    Claims(ClaimsTableError),
    Renewal(RenewalError),
    Advice(AdviceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::HttpClient(err) => write!(f, "http client error: {}", err),
            AppError::Validation(err) => write!(f, "invalid input: {}", err),
            AppError::Claims(err) => write!(f, "claims table error: {}", err),
            AppError::Renewal(err) => write!(f, "invalid renewal request: {}", err),
            AppError::Advice(err) => write!(f, "advice unavailable: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::HttpClient(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Claims(err) => Some(err),
            AppError::Renewal(err) => Some(err),
            AppError::Advice(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Renewal(_)
            | AppError::Advice(AdviceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Advice(AdviceError::Unconfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Advice(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::HttpClient(_)
            | AppError::Claims(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(err) | AppError::Advice(AdviceError::Validation(err)) => {
                Json(json!({ "error": self.to_string(), "field": err.field() }))
            }
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::HttpClient(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ClaimsTableError> for AppError {
    fn from(value: ClaimsTableError) -> Self {
        Self::Claims(value)
    }
}

impl From<RenewalError> for AppError {
    fn from(value: RenewalError) -> Self {
        Self::Renewal(value)
    }
}

impl From<AdviceError> for AppError {
    fn from(value: AdviceError) -> Self {
        Self::Advice(value)
    }
}
