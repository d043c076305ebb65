//! REST client for the market desk backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use desk_core::types::{
    AlertCreated, AlertsResponse, AnalysesResponse, ErrorDetail, SymbolsResponse,
};
use desk_core::{
    Alert, AnalysisRecord, Endpoints, FileSubmission, HealthStatus, IndicatorSnapshot,
    MeetingSummary, SymbolInfo, TextSubmission, ValidationError,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::DeskConfig;
use crate::constants::SUMMARIZE_TIMEOUT_SECS;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {detail}")]
    Status {
        url: String,
        status: StatusCode,
        detail: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(config: &DeskConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn symbols(&self) -> ApiResult<Vec<SymbolInfo>> {
        let url = self.endpoints.symbols();
        let body: SymbolsResponse = self.send(&url, self.http.get(&url)).await?;
        Ok(body.symbols)
    }

    pub async fn alerts(&self) -> ApiResult<Vec<Alert>> {
        let url = self.endpoints.alerts();
        let body: AlertsResponse = self.send(&url, self.http.get(&url)).await?;
        Ok(body.alerts)
    }

    pub async fn create_alert(&self, alert: &Alert) -> ApiResult<AlertCreated> {
        let url = self.endpoints.alerts();
        self.send(&url, self.http.post(&url).json(alert)).await
    }

    pub async fn analyses(&self, symbol: &str) -> ApiResult<Vec<AnalysisRecord>> {
        let url = self.endpoints.analysis(symbol);
        let body: AnalysesResponse = self.send(&url, self.http.get(&url)).await?;
        Ok(body.analyses)
    }

    /// `Ok(None)` when the backend has no data for the symbol yet.
    pub async fn indicators(&self, symbol: &str) -> ApiResult<Option<IndicatorSnapshot>> {
        let url = self.endpoints.indicators(symbol);
        match self.send(&url, self.http.get(&url)).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        let url = self.endpoints.health();
        self.send(&url, self.http.get(&url)).await
    }

    pub async fn meetings(&self) -> ApiResult<Vec<MeetingSummary>> {
        let url = self.endpoints.meetings();
        self.send(&url, self.http.get(&url)).await
    }

    pub async fn meeting(&self, id: &str) -> ApiResult<MeetingSummary> {
        let url = self.endpoints.meeting(id);
        self.send(&url, self.http.get(&url)).await
    }

    pub async fn summarize_text(&self, submission: &TextSubmission) -> ApiResult<MeetingSummary> {
        let request = submission.validate()?;
        let url = self.endpoints.summarize_text();
        let builder = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(SUMMARIZE_TIMEOUT_SECS))
            .json(&request);
        self.send(&url, builder).await
    }

    /// Extension and title are checked before the file is even read.
    pub async fn summarize_file(&self, title: &str, path: &Path) -> ApiResult<MeetingSummary> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        let submission = FileSubmission {
            title: title.to_string(),
            file_name: file_name.clone(),
        };
        let (title, kind) = submission.validate()?;
        let file_name = file_name.unwrap_or_default();

        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let url = self.endpoints.summarize_file();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(kind.mime_type())
            .map_err(|source| ApiError::Network {
                url: url.clone(),
                source,
            })?;
        let form = Form::new().text("title", title).part("file", part);

        let builder = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(SUMMARIZE_TIMEOUT_SECS))
            .multipart(form);
        self.send(&url, builder).await
    }

    async fn send<T: DeserializeOwned>(&self, url: &str, builder: RequestBuilder) -> ApiResult<T> {
        log::debug!("request {url}");
        let response = builder.send().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorDetail>(&text)
                .map(|detail| detail.message())
                .unwrap_or(text);
            log::warn!("{url} returned {status}: {detail}");
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                detail,
            });
        }

        response.json::<T>().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
