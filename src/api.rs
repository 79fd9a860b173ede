//! HTTP helpers for JSON APIs with consistent timeouts and error handling.
//! The session components use these helpers to avoid duplicating request
//! setup and to enforce a predictable timeout policy. Cookies are kept in
//! the client's jar so role sessions survive across calls; the helpers
//! never log credentials or response bodies.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::{config::AppConfig, errors::AppError, routes::RouteTable, APP_USER_AGENT};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// JSON API client: a cookie-holding `reqwest` client plus the rewrite table.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    routes: RouteTable,
}

impl ApiClient {
    /// Builds a client for the configured backend.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            routes: RouteTable::new(&config.api_base_url),
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Fetches JSON and returns `None` on 204 or 401 (no session).
    ///
    /// # Errors
    /// Returns an error on transport failure, other non-success statuses, or
    /// an undecodable body.
    pub async fn get_optional_json(&self, path: &str) -> Result<Option<Value>, AppError> {
        let url = self.routes.rewrite(path);
        let span = info_span!("api.get", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_optional_json_response(response).await
    }

    /// Fetches JSON from a 2xx endpoint; an empty body decodes as `null`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or an
    /// undecodable body.
    pub async fn get_json(&self, path: &str) -> Result<Value, AppError> {
        let url = self.routes.rewrite(path);
        let span = info_span!("api.get", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Posts JSON and parses the response; an empty body decodes as `null`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or an
    /// undecodable body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        let url = self.routes.rewrite(path);
        let span = info_span!("api.post", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Posts an empty body, used to clear a session.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn post_empty(&self, path: &str) -> Result<(), AppError> {
        let url = self.routes.rewrite(path);
        let span = info_span!("api.post", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(http_error(response).await)
        }
    }
}

/// Maps network errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response(response: Response) -> Result<Value, AppError> {
    if !response.status().is_success() {
        return Err(http_error(response).await);
    }
    let body = response
        .text()
        .await
        .map_err(|err| AppError::Parse(format!("Failed to read response: {err}")))?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
}

/// Parses optional JSON responses and treats 204/401 as no session.
async fn handle_optional_json_response(response: Response) -> Result<Option<Value>, AppError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::UNAUTHORIZED {
        return Ok(None);
    }
    handle_json_response(response).await.map(|value| {
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    })
}

async fn http_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AppError::Http {
        status,
        message: sanitize_body(body),
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and
/// truncating.
fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

/// Extracts a `message` field from a JSON error body, if present.
pub(crate) fn body_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message").and_then(Value::as_str)?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
