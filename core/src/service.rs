use std::sync::Arc;

use serde_json::Value;

use crate::amount::ValidatedAmount;
use crate::config::{Credentials, EndpointConfig};
use crate::error::Result;
use crate::network::{TransactionApi, TransactionClient, TransactionKind};

/// Binds a backend to one user's credentials and endpoint, so widgets only
/// have to supply amounts. Read-only after construction; every widget of a
/// host shares the same `Arc<TransactionService>`.
pub struct TransactionService {
    api: Arc<dyn TransactionApi>,
    credentials: Credentials,
    endpoint: EndpointConfig,
}

impl TransactionService {
    pub fn new(
        api: Arc<dyn TransactionApi>,
        credentials: Credentials,
        endpoint: EndpointConfig,
    ) -> Self {
        Self {
            api,
            credentials,
            endpoint,
        }
    }

    /// Service backed by the HTTP [`TransactionClient`]. Rejects base URLs
    /// that are not http(s).
    pub fn http(credentials: Credentials, endpoint: EndpointConfig) -> Result<Self> {
        endpoint.validate()?;
        Ok(Self::new(
            Arc::new(TransactionClient::new()),
            credentials,
            endpoint,
        ))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub async fn deposit(&self, amount: ValidatedAmount) -> Result<Value> {
        self.api
            .deposit(amount, &self.credentials, &self.endpoint)
            .await
    }

    pub async fn withdraw(&self, amount: ValidatedAmount) -> Result<Value> {
        self.api
            .withdraw(amount, &self.credentials, &self.endpoint)
            .await
    }

    pub async fn transact(&self, kind: TransactionKind, amount: ValidatedAmount) -> Result<Value> {
        match kind {
            TransactionKind::Deposit => self.deposit(amount).await,
            TransactionKind::Withdraw => self.withdraw(amount).await,
        }
    }

    pub async fn balance(&self) -> Result<f64> {
        self.api
            .get_balance(&self.credentials, &self.endpoint)
            .await
    }
}
