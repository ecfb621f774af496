//! Deposit/withdraw switcher.
//!
//! Owns one controller per kind behind a single shared [`WalletGate`], and
//! forwards successful completions to the host tagged with the kind that
//! was captured when the request was dispatched. Switching tabs while a
//! request is pending therefore never mislabels its result.

use std::sync::Arc;

use tracing::debug;

use crate::controller::{Submission, TransactionCompletion, TransactionController};
use crate::gate::WalletGate;
use crate::network::TransactionKind;
use crate::service::TransactionService;

type TransactionCallback = Box<dyn FnMut(TransactionKind, f64) + Send>;

pub struct CompositeSelector {
    selection: TransactionKind,
    deposit: TransactionController,
    withdraw: TransactionController,
    gate: WalletGate,
    on_transaction_success: Option<TransactionCallback>,
}

impl CompositeSelector {
    pub fn new(service: Arc<TransactionService>, gate: WalletGate) -> Self {
        Self {
            selection: TransactionKind::default(),
            deposit: TransactionController::new(TransactionKind::Deposit, service.clone()),
            withdraw: TransactionController::new(TransactionKind::Withdraw, service),
            gate,
            on_transaction_success: None,
        }
    }

    pub fn with_on_transaction_success(
        mut self,
        callback: impl FnMut(TransactionKind, f64) + Send + 'static,
    ) -> Self {
        self.on_transaction_success = Some(Box::new(callback));
        self
    }

    pub fn selection(&self) -> TransactionKind {
        self.selection
    }

    pub fn select(&mut self, kind: TransactionKind) {
        self.selection = kind;
    }

    pub fn gate(&self) -> &WalletGate {
        &self.gate
    }

    /// Read-only access for rendering, regardless of the gate.
    pub fn controller(&self, kind: TransactionKind) -> &TransactionController {
        match kind {
            TransactionKind::Deposit => &self.deposit,
            TransactionKind::Withdraw => &self.withdraw,
        }
    }

    pub fn active(&self) -> &TransactionController {
        self.controller(self.selection)
    }

    /// Mutable access to the active controller; `None` while the gate is closed.
    pub fn active_mut(&mut self) -> Option<&mut TransactionController> {
        let controller = match self.selection {
            TransactionKind::Deposit => &mut self.deposit,
            TransactionKind::Withdraw => &mut self.withdraw,
        };
        self.gate.pass(controller)
    }

    /// Edit the active tab's amount. `false` if gated or pending.
    pub fn set_amount_input(&mut self, text: impl Into<String>) -> bool {
        self.active_mut()
            .map(|c| c.set_amount_input(text))
            .unwrap_or(false)
    }

    /// Submit on the active tab. `None` if the gate is closed, in which case
    /// the controller is not touched at all.
    pub fn submit(&mut self) -> Option<Submission> {
        let submission = self.active_mut().map(TransactionController::submit);
        if submission.is_none() {
            debug!(kind = %self.selection, "submit blocked by wallet gate");
        }
        submission
    }

    /// Route a completion to the controller that issued it and notify the
    /// host on success. Returns the applied amount if it was a success.
    pub fn complete(&mut self, completion: TransactionCompletion) -> Option<f64> {
        let kind = completion.kind;
        let applied = match kind {
            TransactionKind::Deposit => self.deposit.complete(completion),
            TransactionKind::Withdraw => self.withdraw.complete(completion),
        }?;
        if let Some(callback) = self.on_transaction_success.as_mut() {
            callback(kind, applied);
        }
        Some(applied)
    }

    /// True if either tab has a request in flight.
    pub fn has_pending(&self) -> bool {
        self.deposit.is_pending() || self.withdraw.is_pending()
    }
}
