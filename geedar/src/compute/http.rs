//! JSON gateway adapter.
//!
//! Posts serde-serialized requests to a gateway sitting in front of the
//! compute engine:
//!
//! | Operation               | Endpoint                          |
//! |-------------------------|-----------------------------------|
//! | `reduce`                | `POST <endpoint>/reduce`          |
//! | `list_available_dates`  | `POST <endpoint>/available-dates` |
//!
//! Responses carry either a result or an `error` message, which is
//! classified like any engine message.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::{ComputeError, ComputeService, Fragment, ReduceRequest};
use crate::geo::Region;

/// Default request timeout; longer than the engine's own limit.
const DEFAULT_TIMEOUT_SECS: u64 = 360;

const USER_AGENT: &str = concat!("geedar/", env!("CARGO_PKG_VERSION"));

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid gateway response: {0}")]
    Decode(String),
}

impl From<GatewayError> for ComputeError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Timeout => ComputeError::Timeout,
            GatewayError::Status { status: 408 | 504, .. } => ComputeError::Timeout,
            GatewayError::Status { status: 413, .. } => ComputeError::PayloadTooLarge,
            GatewayError::Status { body, .. } => ComputeError::classify(&body),
            other => ComputeError::Transient(other.to_string()),
        }
    }
}

/// Trait for asynchronous HTTP operations.
///
/// Allows the gateway adapter to be tested without a network.
pub trait AsyncHttpClient: Send + Sync {
    /// Posts a JSON body, optionally with a bearer token, returning the
    /// response body of a successful response.
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;
}

/// HTTP client backed by reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, GatewayError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn post_json(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: Option<&str>,
    ) -> Result<Vec<u8>, GatewayError> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string());
        if let Some(token) = bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Request(format!("Failed to read response: {}", e))
                }
            })
    }
}

#[derive(Serialize)]
struct AvailabilityRequest<'a> {
    product: u16,
    dates: &'a [NaiveDate],
    region: &'a Region,
}

#[derive(Deserialize)]
struct GatewayResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

/// Compute service reached through a JSON gateway.
pub struct HttpComputeService<H: AsyncHttpClient> {
    client: H,
    endpoint: String,
    token: Option<String>,
}

impl<H: AsyncHttpClient> HttpComputeService<H> {
    pub fn new(client: H, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<B, T>(&self, path: &str, body: &B) -> Result<T, ComputeError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, path);
        let json = serde_json::to_string(body)
            .map_err(|e| ComputeError::Transient(format!("Failed to encode request: {}", e)))?;
        trace!(url = %url, bytes = json.len(), "Posting gateway request");

        let bytes = self
            .client
            .post_json(&url, &json, self.token.as_deref())
            .await?;

        let response: GatewayResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ComputeError::from(GatewayError::Decode(e.to_string())))?;
        match (response.result, response.error) {
            (_, Some(message)) => Err(ComputeError::classify(&message)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(GatewayError::Decode("response has neither result nor error".into()).into()),
        }
    }
}

impl<H: AsyncHttpClient> ComputeService for HttpComputeService<H> {
    async fn reduce(&self, request: &ReduceRequest) -> Result<Fragment, ComputeError> {
        let fragment: Fragment = self.call("reduce", request).await?;
        debug!(
            product = request.expression.product,
            requested = request.expression.dates.len(),
            returned = fragment.len(),
            "Reduction returned"
        );
        Ok(fragment)
    }

    async fn list_available_dates(
        &self,
        product: u16,
        dates: &[NaiveDate],
        region: &Region,
    ) -> Result<Vec<NaiveDate>, ComputeError> {
        let body = AvailabilityRequest {
            product,
            dates,
            region,
        };
        let mut available: Vec<NaiveDate> = self.call("available-dates", &body).await?;
        available.sort();
        available.dedup();
        Ok(available)
    }
}
