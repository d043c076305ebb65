use std::fmt;

use desk_core::types::{
    AlertCreated, AlertsResponse, AnalysesResponse, ErrorDetail, SymbolsResponse,
};
use desk_core::{
    Alert, AnalysisRecord, DEFAULT_BACKEND_URL, EndpointError, Endpoints, SymbolInfo,
    ValidationError,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

/// Failures surfaced to the user as notices.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    Network(String),
    Status { status: u16, detail: String },
    Decode(String),
    Validation(ValidationError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(err) => write!(f, "network error: {err}"),
            ApiError::Status { status, detail } if detail.is_empty() => {
                write!(f, "request failed ({status})")
            }
            ApiError::Status { status, detail } => write!(f, "{detail} ({status})"),
            ApiError::Decode(err) => write!(f, "unexpected response: {err}"),
            ApiError::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Validation(value)
    }
}

/// Backend base URL: baked in at build time, else the page origin.
pub fn backend_url() -> String {
    if let Some(url) = option_env!("BACKEND_URL").filter(|url| !url.is_empty()) {
        return url.to_string();
    }
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .filter(|origin| origin.starts_with("http"))
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

pub fn resolve_endpoints() -> Result<Endpoints, EndpointError> {
    let base = backend_url();
    Endpoints::from_base(&base).or_else(|err| {
        log::error!("invalid backend url {base}: {err}; using {DEFAULT_BACKEND_URL}");
        Endpoints::from_base(DEFAULT_BACKEND_URL)
    })
}

pub async fn fetch_symbols(endpoints: &Endpoints) -> Result<Vec<SymbolInfo>, ApiError> {
    let body: SymbolsResponse = get_json(&endpoints.symbols()).await?;
    Ok(body.symbols)
}

pub async fn fetch_alerts(endpoints: &Endpoints) -> Result<Vec<Alert>, ApiError> {
    let body: AlertsResponse = get_json(&endpoints.alerts()).await?;
    Ok(body.alerts)
}

pub async fn fetch_analyses(
    endpoints: &Endpoints,
    symbol: &str,
) -> Result<Vec<AnalysisRecord>, ApiError> {
    let body: AnalysesResponse = get_json(&endpoints.analysis(symbol)).await?;
    Ok(body.analyses)
}

pub async fn create_alert(endpoints: &Endpoints, alert: &Alert) -> Result<AlertCreated, ApiError> {
    let request = Request::post(&endpoints.alerts())
        .json(alert)
        .map_err(|err| ApiError::Network(err.to_string()))?;
    let response = request
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;
    read_json(response).await
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    log::debug!("GET {url}");
    let response = Request::get(url)
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;
    read_json(response).await
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        let text = response.text().await.unwrap_or_default();
        return Err(status_error(response.status(), &text));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn status_error(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorDetail>(body)
        .map(|detail| detail.message())
        .unwrap_or_else(|_| body.trim().to_string());
    ApiError::Status { status, detail }
}
