use serde_json::Value;
use tracing::debug;

use super::types::{TransactionKind, TransactionRequest};
use super::{success_body, TransactionClient};
use crate::amount::ValidatedAmount;
use crate::config::{Credentials, EndpointConfig};
use crate::error::Result;

impl TransactionClient {
    /// POST a deposit or withdrawal and hand back the decoded body untouched.
    pub(super) async fn post_transaction(
        &self,
        kind: TransactionKind,
        amount: ValidatedAmount,
        credentials: &Credentials,
        endpoint: &EndpointConfig,
    ) -> Result<Value> {
        let operation = kind.operation();
        let url = endpoint.endpoint(operation.path());
        debug!(%url, %amount, user_id = credentials.user_id(), "posting {kind}");

        let payload = TransactionRequest {
            user_id: credentials.user_id(),
            access_code: credentials.access_code(),
            amount,
        };
        let response = self.http.post(&url).json(&payload).send().await;

        let (_, body) = success_body(operation, response).await?;
        Ok(body)
    }
}
