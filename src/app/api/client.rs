use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app::api::endpoints::ApiEndpoints;
use crate::app::config::ApiSettings;
use crate::app::error::AppError;

/// What went wrong with a remote call, in the client's own terms:
/// the transport failed, the server said no, or the body made no sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Api,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Api,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Parse,
            message: message.into(),
        }
    }

    pub fn into_app_error(self, trace_id: &str) -> AppError {
        match self.kind {
            FailureKind::Network => AppError::network(self.message, trace_id),
            FailureKind::Api => AppError::api(self.message, trace_id),
            FailureKind::Parse => AppError::parse(self.message, trace_id),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Network => write!(f, "network error: {}", self.message),
            FailureKind::Api => write!(f, "api error: {}", self.message),
            FailureKind::Parse => write!(f, "parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// Thin HTTP client for the Link PHP API. Every endpoint answers with the
/// same envelope (`success`, optional `message`, payload fields); this type
/// owns the envelope rules so callers only ever see classified failures or
/// an already-validated payload. No retries, no caching.
#[derive(Debug, Clone)]
pub struct LinkClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
}

impl LinkClient {
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiFailure> {
        let endpoints = ApiEndpoints::new(&settings.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| ApiFailure::network(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiFailure> {
        let response = self
            .http
            .get(self.endpoints.url(endpoint))
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;
        classify_body(status, &body)
    }

    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, ApiFailure> {
        let response = self
            .http
            .post(self.endpoints.url(endpoint))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;
        classify_body(status, &body)
    }

    /// The family-member and device-verification endpoints are plain PHP
    /// form handlers, not JSON readers.
    pub async fn post_form(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiFailure> {
        let response = self
            .http
            .post(self.endpoints.url(endpoint))
            .header(ACCEPT, "application/json")
            .form(params)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;
        classify_body(status, &body)
    }
}

fn classify_transport_error(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::network("Request timed out")
    } else if err.is_connect() {
        ApiFailure::network("Cannot connect to server. Check your connection.")
    } else {
        ApiFailure::network(err.to_string())
    }
}

/// Envelope classification, factored out of the transport so it can be
/// exercised without a server:
/// - non-JSON body → Parse (or Network when the status already failed);
/// - HTTP error whose body carries a server `message` → Api with it;
/// - `success: false` → Api with the server message;
/// - `success: true` → the whole envelope for the typed decoders.
pub fn classify_body(status: StatusCode, body: &str) -> Result<Value, ApiFailure> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if !status.is_success() {
        if let Some(message) = value.as_ref().and_then(envelope_message) {
            return Err(ApiFailure::api(message));
        }
        return Err(ApiFailure::network(format!(
            "Network error. Please check your connection. (HTTP {})",
            status.as_u16()
        )));
    }

    let value = match value {
        Some(Value::Object(map)) => Value::Object(map),
        _ => return Err(ApiFailure::parse("Invalid server response")),
    };

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(value),
        Some(false) => Err(ApiFailure::api(
            envelope_message(&value).unwrap_or_else(|| "Request failed".to_string()),
        )),
        None => Err(ApiFailure::parse("Invalid server response")),
    }
}

/// Failure payloads usually use `message`; a few endpoints report `error`.
pub fn envelope_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .map(|s| s.to_string())
}

/// Pulls one typed field out of a successful envelope.
pub fn decode_field<T: DeserializeOwned>(value: &Value, key: &str) -> Result<T, ApiFailure> {
    let field = value
        .get(key)
        .cloned()
        .ok_or_else(|| ApiFailure::parse(format!("Response is missing `{key}`")))?;
    serde_json::from_value(field)
        .map_err(|err| ApiFailure::parse(format!("Unexpected shape for `{key}`: {err}")))
}
