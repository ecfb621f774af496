/// HTTP client for the custodial token backend.
mod transfer;
mod types;

pub use types::*;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::amount::ValidatedAmount;
use crate::config::{Credentials, EndpointConfig};
use crate::error::{Result, WidgetError};

/// The backend as seen by the widgets. [`TransactionClient`] is the HTTP
/// implementation; hosts and tests can swap in their own.
///
/// Every call makes exactly one request: no retries, no caching.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Credit `amount` to the user's balance. Returns the response body as-is.
    async fn deposit(
        &self,
        amount: ValidatedAmount,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<Value>;

    /// Debit `amount` from the user's balance. Returns the response body as-is.
    async fn withdraw(
        &self,
        amount: ValidatedAmount,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<Value>;

    /// Current balance of the user.
    async fn get_balance(&self, credentials: &Credentials, endpoint: &EndpointConfig)
        -> Result<f64>;
}

pub struct TransactionClient {
    pub(super) http: Client,
}

impl Default for TransactionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Reuse an existing `reqwest::Client` (connection pool, proxy settings).
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    pub(super) async fn fetch_balance(
        &self,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<f64> {
        let operation = Operation::Balance;
        let url = endpoint.endpoint(operation.path());
        debug!(%url, user_id = credentials.user_id(), "querying balance");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[
                ("userId", credentials.user_id()),
                ("accessCode", credentials.access_code()),
            ])
            .send()
            .await;

        let (status, body) = success_body(operation, response).await?;
        let parsed: BalanceResponse = serde_json::from_value(body).map_err(|e| {
            warn!(error = %e, "balance response has no numeric balance field");
            WidgetError::request_default(operation, Some(status))
        })?;
        Ok(parsed.balance)
    }
}

/// Turn a raw reqwest result into the status and decoded success body, or a
/// typed [`WidgetError::Request`].
///
/// Any non-2xx status is a failure regardless of code. The error body is
/// decoded leniently: whatever doesn't parse counts as `{}` and the
/// operation's default message is used.
pub(super) async fn success_body(
    operation: Operation,
    response: std::result::Result<Response, reqwest::Error>,
) -> Result<(u16, Value)> {
    let response = response.map_err(|e| {
        warn!(%operation, error = %e, "request did not complete");
        WidgetError::request_default(operation, None)
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        warn!(%operation, error = %e, "failed to read response body");
        WidgetError::request_default(operation, Some(status.as_u16()))
    })?;

    if !status.is_success() {
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| operation.default_failure_message().to_string());
        debug!(%operation, status = status.as_u16(), %message, "request rejected");
        return Err(WidgetError::Request {
            operation,
            status: Some(status.as_u16()),
            message,
        });
    }

    if text.trim().is_empty() {
        return Ok((status.as_u16(), Value::Null));
    }
    let body = serde_json::from_str(&text).map_err(|e| {
        warn!(%operation, error = %e, "success response is not valid JSON");
        WidgetError::request_default(operation, Some(status.as_u16()))
    })?;
    Ok((status.as_u16(), body))
}

#[async_trait]
impl TransactionApi for TransactionClient {
    async fn deposit(
        &self,
        amount: ValidatedAmount,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<Value> {
        self.post_transaction(TransactionKind::Deposit, amount, credentials, endpoint)
            .await
    }

    async fn withdraw(
        &self,
        amount: ValidatedAmount,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<Value> {
        self.post_transaction(TransactionKind::Withdraw, amount, credentials, endpoint)
            .await
    }

    async fn get_balance(
        &self,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<f64> {
        self.fetch_balance(credentials, endpoint).await
    }
}
