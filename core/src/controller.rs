//! Transaction lifecycle state machine shared by the deposit and withdraw widgets.
//!
//! ```text
//! Idle ──submit──▶ Pending ──success──▶ Succeeded
//!   ▲                 │                     │
//!   │                 └──failure──▶ Failed  │
//!   └────────dismiss────────────────┴───────┘
//! ```
//!
//! `submit` from `Succeeded` or `Failed` behaves exactly like from `Idle`.
//! While `Pending`, `submit` and input edits are ignored: one request per
//! controller, never queued.
//!
//! The request itself is handed to the host as a [`PendingTransaction`]. The
//! host runs it wherever it likes and feeds the resulting
//! [`TransactionCompletion`] back through [`TransactionController::complete`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::amount::{validate, ValidatedAmount};
use crate::error::WidgetError;
use crate::network::{FailureKind, RequestOutcome, TransactionKind};
use crate::service::TransactionService;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one dispatched request. Unique per process, so a completion
/// can only ever be applied to the slot that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub(crate) fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Everything a renderer needs to draw a transaction widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub phase: Phase,
    pub message: Option<String>,
}

impl From<&WidgetError> for FailureKind {
    fn from(err: &WidgetError) -> Self {
        match err {
            WidgetError::Validation(_) => FailureKind::Validation,
            _ => FailureKind::Request,
        }
    }
}

/// Internal state. The in-flight ticket lives inside `Pending`, so "one
/// request at a time" cannot drift out of sync with the phase.
#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Pending(Ticket),
    Succeeded(String),
    Failed(String),
}

/// Result of asking a controller to submit.
#[derive(Debug)]
pub enum Submission {
    /// A request is already in flight; nothing happened.
    Ignored,
    /// The amount didn't validate; the controller is now `Failed`.
    Rejected,
    /// The controller is now `Pending`; run this to get the completion.
    Dispatched(PendingTransaction),
}

/// One request the host must execute. Holds everything needed to run it, so
/// it can be moved onto another task.
pub struct PendingTransaction {
    ticket: Ticket,
    kind: TransactionKind,
    amount: ValidatedAmount,
    service: Arc<TransactionService>,
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("ticket", &self.ticket)
            .field("kind", &self.kind)
            .field("amount", &self.amount)
            .finish_non_exhaustive()
    }
}

impl PendingTransaction {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> ValidatedAmount {
        self.amount
    }

    /// Make the one network call and classify the result.
    pub async fn execute(self) -> TransactionCompletion {
        debug!(ticket = %self.ticket, kind = %self.kind, amount = %self.amount, "executing");
        let outcome = match self.service.transact(self.kind, self.amount).await {
            Ok(body) => RequestOutcome::Success {
                applied_amount: self.amount,
                body,
            },
            Err(e) => RequestOutcome::Failure {
                kind: FailureKind::from(&e),
                message: e.to_string(),
            },
        };
        TransactionCompletion {
            ticket: self.ticket,
            kind: self.kind,
            outcome,
        }
    }

    /// Run on the current tokio runtime and deliver the completion to
    /// `sender`. If the receiver is gone the completion is dropped.
    pub fn spawn<E>(self, sender: UnboundedSender<E>) -> JoinHandle<()>
    where
        E: From<TransactionCompletion> + Send + 'static,
    {
        tokio::spawn(async move {
            let completion = self.execute().await;
            if sender.send(completion.into()).is_err() {
                warn!("completion receiver dropped, discarding result");
            }
        })
    }
}

/// Outcome of a [`PendingTransaction`], tagged with the ticket and kind
/// captured at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCompletion {
    pub ticket: Ticket,
    pub kind: TransactionKind,
    pub outcome: RequestOutcome,
}

type SuccessCallback = Box<dyn FnMut(f64) + Send>;

pub struct TransactionController {
    kind: TransactionKind,
    service: Arc<TransactionService>,
    input: String,
    state: State,
    on_success: Option<SuccessCallback>,
}

impl TransactionController {
    pub fn new(kind: TransactionKind, service: Arc<TransactionService>) -> Self {
        Self {
            kind,
            service,
            input: String::new(),
            state: State::Idle,
            on_success: None,
        }
    }

    /// Called once per successful transaction with the applied amount, after
    /// the controller has moved to `Succeeded`.
    pub fn with_on_success(mut self, callback: impl FnMut(f64) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Pending(_) => Phase::Pending,
            State::Succeeded(_) => Phase::Succeeded,
            State::Failed(_) => Phase::Failed,
        }
    }

    pub fn view(&self) -> ViewState {
        let message = match &self.state {
            State::Succeeded(msg) | State::Failed(msg) => Some(msg.clone()),
            State::Idle | State::Pending(_) => None,
        };
        ViewState {
            phase: self.phase(),
            message,
        }
    }

    pub fn amount_input(&self) -> &str {
        &self.input
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    /// Ticket of the request in flight, if any.
    pub fn in_flight(&self) -> Option<Ticket> {
        match self.state {
            State::Pending(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// Replace the amount text. Refused (returns `false`) while pending.
    pub fn set_amount_input(&mut self, text: impl Into<String>) -> bool {
        if self.is_pending() {
            return false;
        }
        self.input = text.into();
        true
    }

    pub fn submit(&mut self) -> Submission {
        if let State::Pending(ticket) = self.state {
            debug!(kind = %self.kind, %ticket, "submit ignored, request in flight");
            return Submission::Ignored;
        }

        let amount = match validate(&self.input) {
            Ok(amount) => amount,
            Err(e) => {
                debug!(kind = %self.kind, input = %self.input, "amount rejected");
                self.state = State::Failed(e.to_string());
                return Submission::Rejected;
            }
        };

        let ticket = Ticket::next();
        self.state = State::Pending(ticket);
        debug!(kind = %self.kind, %ticket, %amount, "dispatching");
        Submission::Dispatched(PendingTransaction {
            ticket,
            kind: self.kind,
            amount,
            service: self.service.clone(),
        })
    }

    /// Apply a completion. Returns the applied amount on success.
    ///
    /// A completion for anything but the current in-flight ticket is dropped
    /// without touching state.
    pub fn complete(&mut self, completion: TransactionCompletion) -> Option<f64> {
        if self.in_flight() != Some(completion.ticket) {
            warn!(kind = %self.kind, ticket = %completion.ticket, "discarding stale completion");
            return None;
        }

        match completion.outcome {
            RequestOutcome::Success { applied_amount, .. } => {
                self.state = State::Succeeded(self.kind.success_message(applied_amount));
                self.input.clear();
                info!(kind = %self.kind, amount = %applied_amount, "transaction succeeded");
                if let Some(callback) = self.on_success.as_mut() {
                    callback(applied_amount.value());
                }
                Some(applied_amount.value())
            }
            RequestOutcome::Failure { message, .. } => {
                debug!(kind = %self.kind, %message, "transaction failed");
                self.state = State::Failed(message);
                None
            }
        }
    }

    /// Clear a settled result back to `Idle`. Has no effect while pending.
    pub fn dismiss(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.state = State::Idle;
        true
    }

    /// Submit, run the request inline and apply the result.
    pub async fn submit_and_wait(&mut self) -> ViewState {
        if let Submission::Dispatched(pending) = self.submit() {
            let completion = pending.execute().await;
            self.complete(completion);
        }
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::INVALID_AMOUNT_MESSAGE;
    use crate::network::Operation;
    use crate::testing::{rejection, service_with, Call, LogBuffer, ScriptedApi};
    use serde_json::json;
    use std::sync::Mutex;

    fn deposit_controller(api: &Arc<ScriptedApi>) -> TransactionController {
        TransactionController::new(TransactionKind::Deposit, service_with(api.clone()))
    }

    fn dispatched(submission: Submission) -> PendingTransaction {
        match submission {
            Submission::Dispatched(pending) => pending,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn starts_idle_with_empty_input() {
        let api = ScriptedApi::new();
        let controller = deposit_controller(&api);
        assert_eq!(
            controller.view(),
            ViewState {
                phase: Phase::Idle,
                message: None
            }
        );
        assert_eq!(controller.amount_input(), "");
    }

    #[tokio::test]
    async fn successful_deposit_clears_input() {
        let api = ScriptedApi::new();
        api.push_transaction(Ok(json!({})));
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("50");

        let view = controller.submit_and_wait().await;

        assert_eq!(view.phase, Phase::Succeeded);
        assert_eq!(
            view.message.as_deref(),
            Some("Successfully deposited 50 tokens.")
        );
        assert_eq!(controller.amount_input(), "");
        assert_eq!(api.calls(), vec![Call::Deposit(50.0)]);
    }

    #[tokio::test]
    async fn negative_amount_never_reaches_network() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("-5");

        let view = controller.submit_and_wait().await;

        assert_eq!(view.phase, Phase::Failed);
        assert_eq!(view.message.as_deref(), Some(INVALID_AMOUNT_MESSAGE));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn server_rejection_keeps_input() {
        let api = ScriptedApi::new();
        api.push_transaction(Err(rejection(Operation::Withdraw, 400, "Insufficient funds")));
        let mut controller =
            TransactionController::new(TransactionKind::Withdraw, service_with(api.clone()));
        controller.set_amount_input("20");

        let view = controller.submit_and_wait().await;

        assert_eq!(view.phase, Phase::Failed);
        assert_eq!(view.message.as_deref(), Some("Insufficient funds"));
        assert_eq!(controller.amount_input(), "20");
        assert_eq!(api.calls(), vec![Call::Withdraw(20.0)]);
    }

    #[test]
    fn repeated_invalid_submits_are_idempotent() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("abc");

        assert!(matches!(controller.submit(), Submission::Rejected));
        let first = controller.view();
        assert!(matches!(controller.submit(), Submission::Rejected));
        assert!(matches!(controller.submit(), Submission::Rejected));

        assert_eq!(controller.view(), first);
        assert_eq!(first.message.as_deref(), Some(INVALID_AMOUNT_MESSAGE));
        assert_eq!(controller.amount_input(), "abc");
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_ignored() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("10");

        let pending = dispatched(controller.submit());
        assert_eq!(controller.phase(), Phase::Pending);
        assert!(matches!(controller.submit(), Submission::Ignored));
        assert!(matches!(controller.submit(), Submission::Ignored));

        let completion = pending.execute().await;
        controller.complete(completion);

        assert_eq!(api.calls().len(), 1);
        assert_eq!(controller.phase(), Phase::Succeeded);
    }

    #[test]
    fn input_is_locked_while_pending() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("10");
        let _pending = dispatched(controller.submit());

        assert!(!controller.set_amount_input("99"));
        assert_eq!(controller.amount_input(), "10");
        assert!(!controller.dismiss());
    }

    #[tokio::test]
    async fn success_callback_fires_once_after_state_change() {
        let api = ScriptedApi::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut controller = deposit_controller(&api).with_on_success(move |amount| {
            sink.lock().unwrap().push(amount);
        });
        controller.set_amount_input("7.5");

        let pending = dispatched(controller.submit());
        let completion = pending.execute().await;
        let applied = controller.complete(completion.clone());

        assert_eq!(applied, Some(7.5));
        assert_eq!(*seen.lock().unwrap(), vec![7.5]);
        assert_eq!(controller.phase(), Phase::Succeeded);

        // Replaying the same completion must not fire again.
        assert_eq!(controller.complete(completion), None);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_does_not_fire_callback() {
        let api = ScriptedApi::new();
        api.push_transaction(Err(rejection(Operation::Deposit, 500, "Deposit failed")));
        let fired = Arc::new(Mutex::new(false));
        let flag = fired.clone();
        let mut controller = deposit_controller(&api).with_on_success(move |_| {
            *flag.lock().unwrap() = true;
        });
        controller.set_amount_input("1");

        controller.submit_and_wait().await;

        assert!(!*fired.lock().unwrap());
    }

    #[tokio::test]
    async fn can_resubmit_after_failure_and_success() {
        let api = ScriptedApi::new();
        api.push_transaction(Err(rejection(Operation::Deposit, 503, "Try later")));
        api.push_transaction(Ok(json!({"ok": true})));
        api.push_transaction(Ok(json!({"ok": true})));
        let mut controller = deposit_controller(&api);

        controller.set_amount_input("3");
        assert_eq!(controller.submit_and_wait().await.phase, Phase::Failed);
        assert_eq!(controller.submit_and_wait().await.phase, Phase::Succeeded);
        controller.set_amount_input("4");
        assert_eq!(controller.submit_and_wait().await.phase, Phase::Succeeded);

        assert_eq!(
            api.calls(),
            vec![Call::Deposit(3.0), Call::Deposit(3.0), Call::Deposit(4.0)]
        );
    }

    #[tokio::test]
    async fn foreign_completion_is_discarded() {
        let api = ScriptedApi::new();
        let mut deposit = deposit_controller(&api);
        let mut other = deposit_controller(&api);
        deposit.set_amount_input("5");
        other.set_amount_input("6");

        let _mine = dispatched(deposit.submit());
        let theirs = dispatched(other.submit()).execute().await;

        assert_eq!(deposit.complete(theirs), None);
        assert_eq!(deposit.phase(), Phase::Pending);
        assert_eq!(deposit.amount_input(), "5");
    }

    #[test]
    fn dismiss_returns_to_idle() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("");
        controller.submit();
        assert_eq!(controller.phase(), Phase::Failed);

        assert!(controller.dismiss());
        assert_eq!(
            controller.view(),
            ViewState {
                phase: Phase::Idle,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn spawned_request_reports_through_channel() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("12");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<TransactionCompletion>();

        let handle = dispatched(controller.submit()).spawn(tx);
        handle.await.unwrap();
        let completion = rx.recv().await.expect("completion delivered");

        assert_eq!(controller.complete(completion), Some(12.0));
        assert_eq!(
            controller.view().message.as_deref(),
            Some("Successfully deposited 12 tokens.")
        );
    }

    #[tokio::test]
    async fn backend_validation_error_is_tagged_as_validation() {
        let api = ScriptedApi::new();
        api.push_transaction(Err(WidgetError::Validation("Amount too small".into())));
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("0.001");

        let completion = dispatched(controller.submit()).execute().await;

        assert_eq!(
            completion.outcome,
            RequestOutcome::Failure {
                kind: FailureKind::Validation,
                message: "Amount too small".into(),
            }
        );
        controller.complete(completion);
        assert_eq!(controller.view().message.as_deref(), Some("Amount too small"));
    }

    #[tokio::test]
    async fn server_rejection_is_tagged_as_request() {
        let api = ScriptedApi::new();
        api.push_transaction(Err(rejection(Operation::Deposit, 401, "Invalid access code")));
        let mut controller = deposit_controller(&api);
        controller.set_amount_input("1");

        let completion = dispatched(controller.submit()).execute().await;

        assert!(matches!(
            completion.outcome,
            RequestOutcome::Failure {
                kind: FailureKind::Request,
                ..
            }
        ));
    }

    #[test]
    fn discarded_completion_is_logged_as_warning() {
        let api = ScriptedApi::new();
        let mut controller = deposit_controller(&api);
        let logs = LogBuffer::default();
        let late = TransactionCompletion {
            ticket: Ticket::next(),
            kind: TransactionKind::Deposit,
            outcome: RequestOutcome::Failure {
                kind: FailureKind::Request,
                message: "late".into(),
            },
        };

        let applied = logs.capture_warnings(|| controller.complete(late));

        assert_eq!(applied, None);
        assert_eq!(controller.phase(), Phase::Idle);
        let output = logs.contents();
        assert!(output.contains("WARN"), "got: {output}");
        assert!(output.contains("discarding stale completion"));
    }

    #[test]
    fn tickets_are_unique() {
        assert_ne!(Ticket::next(), Ticket::next());
    }
}
