//! Meeting summarizer REST calls.

use std::fmt;

use desk_core::types::{ErrorDetail, SummarizeTextRequest};
use desk_core::{DEFAULT_BACKEND_URL, EndpointError, Endpoints, MeetingSummary, ValidationError};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use web_sys::{File, FormData};

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

pub fn resolve_endpoints() -> Result<Endpoints, EndpointError> {
    let base = option_env!("BACKEND_URL")
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .or_else(|| {
            web_sys::window()
                .and_then(|window| window.location().origin().ok())
                .filter(|origin| origin.starts_with("http"))
        })
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    Endpoints::from_base(&base)
}

pub async fn fetch_meetings(endpoints: &Endpoints) -> Result<Vec<MeetingSummary>, ApiError> {
    send(Request::get(&endpoints.meetings()).build()).await
}

pub async fn fetch_meeting(endpoints: &Endpoints, id: &str) -> Result<MeetingSummary, ApiError> {
    send(Request::get(&endpoints.meeting(id)).build()).await
}

pub async fn summarize_text(
    endpoints: &Endpoints,
    request: &SummarizeTextRequest,
) -> Result<MeetingSummary, ApiError> {
    send(Request::post(&endpoints.summarize_text()).json(request)).await
}

/// Multipart upload with `title` and `file` fields.
pub async fn summarize_file(
    endpoints: &Endpoints,
    title: &str,
    file: &File,
) -> Result<MeetingSummary, ApiError> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_str("title", title).map_err(js_error)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(js_error)?;
    send(Request::post(&endpoints.summarize_file()).body(form)).await
}

fn js_error(err: wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{err:?}"))
}

async fn send<T: DeserializeOwned>(
    request: Result<Request, gloo_net::Error>,
) -> Result<T, ApiError> {
    let response = request
        .map_err(|err| ApiError::Network(err.to_string()))?
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_detail_lists_are_flattened_to_text() {
        let err = status_error(422, r#"{"detail":[{"msg":"field required"}]}"#);
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 422);
                assert!(detail.contains("field required"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn displays_backend_detail() {
        let err = status_error(500, r#"{"detail":"Error processing file: bad zip"}"#);
        assert_eq!(err.to_string(), "Error processing file: bad zip (500)");
    }
}
