/// Balance widget: one `getBalance` at a time, same discard rule as transactions.
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::Ticket;
use crate::service::TransactionService;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Access code and User ID are required.";

#[derive(Debug, Clone, PartialEq)]
pub enum BalancePhase {
    /// Not fetched yet, or a fetch is in flight.
    Loading,
    Loaded(f64),
    Failed(String),
}

pub struct PendingBalance {
    ticket: Ticket,
    service: Arc<TransactionService>,
}

impl fmt::Debug for PendingBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBalance")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl PendingBalance {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub async fn execute(self) -> BalanceCompletion {
        let result = self.service.balance().await.map_err(|e| e.to_string());
        BalanceCompletion {
            ticket: self.ticket,
            result,
        }
    }

    /// Run on the current tokio runtime and deliver the completion to `sender`.
    pub fn spawn<E>(self, sender: UnboundedSender<E>) -> JoinHandle<()>
    where
        E: From<BalanceCompletion> + Send + 'static,
    {
        tokio::spawn(async move {
            let completion = self.execute().await;
            if sender.send(completion.into()).is_err() {
                warn!("balance receiver dropped, discarding result");
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCompletion {
    pub ticket: Ticket,
    pub result: Result<f64, String>,
}

pub struct BalanceView {
    service: Arc<TransactionService>,
    phase: BalancePhase,
    in_flight: Option<Ticket>,
}

impl BalanceView {
    pub fn new(service: Arc<TransactionService>) -> Self {
        Self {
            service,
            phase: BalancePhase::Loading,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> &BalancePhase {
        &self.phase
    }

    pub fn balance(&self) -> Option<f64> {
        match self.phase {
            BalancePhase::Loaded(balance) => Some(balance),
            _ => None,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a fetch unless one is already running. Incomplete credentials
    /// fail immediately without a request.
    pub fn refresh(&mut self) -> Option<PendingBalance> {
        if self.in_flight.is_some() {
            debug!("balance refresh ignored, fetch in flight");
            return None;
        }
        if !self.service.credentials().is_complete() {
            self.phase = BalancePhase::Failed(MISSING_CREDENTIALS_MESSAGE.to_string());
            return None;
        }

        let ticket = Ticket::next();
        self.in_flight = Some(ticket);
        self.phase = BalancePhase::Loading;
        Some(PendingBalance {
            ticket,
            service: self.service.clone(),
        })
    }

    pub fn complete(&mut self, completion: BalanceCompletion) -> bool {
        if self.in_flight != Some(completion.ticket) {
            warn!(ticket = %completion.ticket, "discarding stale balance");
            return false;
        }
        self.in_flight = None;
        self.phase = match completion.result {
            Ok(balance) => BalancePhase::Loaded(balance),
            Err(message) => BalancePhase::Failed(message),
        };
        true
    }

    pub async fn refresh_and_wait(&mut self) -> &BalancePhase {
        if let Some(pending) = self.refresh() {
            let completion = pending.execute().await;
            self.complete(completion);
        }
        &self.phase
    }
}
