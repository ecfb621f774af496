/// The terminal host: owns the widgets, runs their requests on the tokio
/// runtime and applies the results as they come back.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use token_widget_core::display::format_amount;
use token_widget_core::{
    BalanceCompletion, BalancePhase, BalanceView, CompositeSelector, Submission,
    TransactionCompletion, TransactionKind, TransactionService, WalletConnector, WalletGate,
};

use crate::commands::{help_text, Command};
use crate::render::{balance_output, render_gate, render_tabs, transaction_output, Labels};

const GATED_MESSAGE: &str = "Connect your wallet first. Type 'connect'.";

#[derive(Debug)]
pub(crate) enum Event {
    Transaction(TransactionCompletion),
    Balance(BalanceCompletion),
}

impl From<TransactionCompletion> for Event {
    fn from(completion: TransactionCompletion) -> Self {
        Event::Transaction(completion)
    }
}

impl From<BalanceCompletion> for Event {
    fn from(completion: BalanceCompletion) -> Self {
        Event::Balance(completion)
    }
}

/// Session-only wallet: `connect` flips between connected and disconnected,
/// like the web widget's Connect/Disconnect button.
#[derive(Debug, Default)]
pub(crate) struct SessionConnector {
    connected: AtomicBool,
}

impl WalletConnector for SessionConnector {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connect(&self) {
        self.connected.fetch_xor(true, Ordering::SeqCst);
    }
}

pub(crate) struct Host {
    selector: CompositeSelector,
    balance: BalanceView,
    gate: WalletGate,
    labels: Labels,
    json: bool,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    notices: UnboundedReceiver<String>,
    outstanding: usize,
}

impl Host {
    pub(crate) fn new(
        service: Arc<TransactionService>,
        connector: Option<Arc<dyn WalletConnector>>,
        json: bool,
    ) -> Self {
        let gate = connector.map(WalletGate::new).unwrap_or_default();
        let (notice_tx, notices) = unbounded_channel();
        let selector = CompositeSelector::new(service.clone(), gate.clone())
            .with_on_transaction_success(move |kind, amount| {
                let notice = format!("{kind} of {} tokens completed", format_amount(amount));
                if notice_tx.send(notice).is_err() {
                    debug!("notice receiver dropped");
                }
            });
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            selector,
            balance: BalanceView::new(service),
            gate,
            labels: Labels::default(),
            json,
            events_tx,
            events_rx,
            notices,
            outstanding: 0,
        }
    }

    /// Requests dispatched but not yet applied.
    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub(crate) fn is_gated(&self) -> bool {
        !self.gate.is_open()
    }

    pub(crate) async fn execute(&mut self, command: &Command) -> String {
        match command {
            Command::Transact { kind, amount } => {
                self.selector.select(*kind);
                match amount {
                    Some(text) => self.enter_and_submit(text),
                    None => self.render_active(),
                }
            }
            Command::Amount { text } => {
                if self.is_gated() {
                    return GATED_MESSAGE.to_string();
                }
                if self.selector.set_amount_input(text.as_str()) {
                    self.render_active()
                } else {
                    self.labels.busy.clone()
                }
            }
            Command::Submit => self.submit(),
            Command::Tab { kind } => {
                self.selector.select(*kind);
                self.render_active()
            }
            Command::Balance => self.refresh_balance(),
            Command::Connect => {
                if self.gate.connect() {
                    self.mount();
                    render_gate(&self.labels, &self.gate)
                } else {
                    "This session does not require a wallet.".to_string()
                }
            }
            Command::Status => {
                self.mount();
                self.render_status()
            }
            Command::Wait => {
                if self.outstanding == 0 {
                    "Nothing pending.".to_string()
                } else {
                    self.wait().await
                }
            }
            Command::Dismiss => {
                let Some(controller) = self.selector.active_mut() else {
                    return GATED_MESSAGE.to_string();
                };
                if controller.dismiss() {
                    self.render_active()
                } else {
                    self.labels.busy.clone()
                }
            }
            Command::Help { command } => help_text(command.as_deref()),
            Command::Exit => String::new(),
        }
    }

    fn enter_and_submit(&mut self, text: &str) -> String {
        if self.is_gated() {
            return GATED_MESSAGE.to_string();
        }
        if !self.selector.set_amount_input(text) {
            return self.labels.busy.clone();
        }
        self.submit()
    }

    fn submit(&mut self) -> String {
        match self.selector.submit() {
            None => GATED_MESSAGE.to_string(),
            Some(Submission::Ignored) => self.labels.busy.clone(),
            Some(Submission::Rejected) => self.render_active(),
            Some(Submission::Dispatched(pending)) => {
                drop(pending.spawn(self.events_tx.clone()));
                self.outstanding += 1;
                self.render_active()
            }
        }
    }

    /// First balance fetch, as the balance widget does when it is shown.
    /// Does nothing while gated or once a fetch has been started.
    pub(crate) fn mount(&mut self) {
        if self.balance_started() {
            return;
        }
        let Some(balance) = self.gate.pass(&mut self.balance) else {
            return;
        };
        if let Some(pending) = balance.refresh() {
            drop(pending.spawn(self.events_tx.clone()));
            self.outstanding += 1;
        }
    }

    fn balance_started(&self) -> bool {
        self.balance.is_fetching() || !matches!(self.balance.phase(), BalancePhase::Loading)
    }

    fn refresh_balance(&mut self) -> String {
        let Some(balance) = self.gate.pass(&mut self.balance) else {
            return GATED_MESSAGE.to_string();
        };
        if let Some(pending) = balance.refresh() {
            drop(pending.spawn(self.events_tx.clone()));
            self.outstanding += 1;
        }
        balance_output(self.balance.phase(), self.json)
    }

    /// Apply every completion that has already arrived. Returns what changed.
    pub(crate) fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            lines.extend(self.apply(event));
        }
        lines
    }

    /// Block until every outstanding request has been applied.
    pub(crate) async fn wait(&mut self) -> String {
        let mut lines = Vec::new();
        while self.outstanding > 0 {
            match self.events_rx.recv().await {
                Some(event) => lines.extend(self.apply(event)),
                None => break,
            }
        }
        lines.join("\n")
    }

    fn apply(&mut self, event: Event) -> Vec<String> {
        self.outstanding = self.outstanding.saturating_sub(1);
        let mut lines = Vec::new();
        match event {
            Event::Transaction(completion) => {
                let kind = completion.kind;
                self.selector.complete(completion);
                let controller = self.selector.controller(kind);
                if !controller.is_pending() {
                    lines.push(transaction_output(&self.labels, controller, self.json));
                }
            }
            Event::Balance(completion) => {
                if self.balance.complete(completion) {
                    lines.push(balance_output(self.balance.phase(), self.json));
                }
            }
        }
        while let Ok(notice) = self.notices.try_recv() {
            lines.push(notice);
        }
        lines
    }

    fn render_active(&self) -> String {
        transaction_output(&self.labels, self.selector.active(), self.json)
    }

    fn render_status(&self) -> String {
        let mut sections = Vec::new();
        if !self.json {
            sections.push(render_tabs(&self.labels, &self.selector));
        }
        for kind in TransactionKind::ALL {
            sections.push(transaction_output(
                &self.labels,
                self.selector.controller(kind),
                self.json,
            ));
        }
        // Before the first fetch there is no balance to show, only the gate.
        if self.balance_started() {
            sections.push(balance_output(self.balance.phase(), self.json));
        }
        if !self.json {
            let gate = render_gate(&self.labels, &self.gate);
            if !gate.is_empty() {
                sections.push(gate);
            }
        }
        sections.join("\n")
    }
}
