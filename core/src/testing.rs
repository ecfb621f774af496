//! In-memory `TransactionApi` double shared by the unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing_subscriber::fmt::MakeWriter;

use crate::amount::ValidatedAmount;
use crate::config::{Credentials, EndpointConfig};
use crate::error::{Result, WidgetError};
use crate::network::{Operation, TransactionApi};
use crate::service::TransactionService;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Deposit(f64),
    Withdraw(f64),
    Balance,
}

/// Records every call and answers from per-operation queues. Empty queues
/// answer `{}` for transactions and `0.0` for balances.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    calls: Mutex<Vec<Call>>,
    transactions: Mutex<VecDeque<Result<Value>>>,
    balances: Mutex<VecDeque<Result<f64>>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_transaction(&self, response: Result<Value>) {
        self.transactions.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_balance(&self, response: Result<f64>) {
        self.balances.lock().unwrap().push_back(response);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_transaction(&self) -> Result<Value> {
        self.transactions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

#[async_trait]
impl TransactionApi for ScriptedApi {
    async fn deposit(
        &self,
        amount: ValidatedAmount,
        _credentials: &Credentials,
        _endpoint: &EndpointConfig,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(Call::Deposit(amount.value()));
        self.next_transaction()
    }

    async fn withdraw(
        &self,
        amount: ValidatedAmount,
        _credentials: &Credentials,
        _endpoint: &EndpointConfig,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(Call::Withdraw(amount.value()));
        self.next_transaction()
    }

    async fn get_balance(
        &self,
        _credentials: &Credentials,
        _endpoint: &EndpointConfig,
    ) -> Result<f64> {
        self.calls.lock().unwrap().push(Call::Balance);
        self.balances.lock().unwrap().pop_front().unwrap_or(Ok(0.0))
    }
}

pub(crate) fn rejection(operation: Operation, status: u16, message: &str) -> WidgetError {
    WidgetError::Request {
        operation,
        status: Some(status),
        message: message.to_string(),
    }
}

pub(crate) fn service_with(api: Arc<ScriptedApi>) -> Arc<TransactionService> {
    Arc::new(TransactionService::new(
        api,
        Credentials::new("user-1", "code-1"),
        EndpointConfig::default(),
    ))
}

/// Collects formatted log output so tests can assert on levels and messages.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with a warn-level subscriber writing into this buffer.
    pub(crate) fn capture_warnings<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
