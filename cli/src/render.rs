/// Plain-text rendering of widget state for the terminal.
use token_widget_core::display::{format_balance, format_balance_json, format_view_json};
use token_widget_core::{
    BalancePhase, CompositeSelector, GateStatus, Phase, TransactionController, TransactionKind,
    WalletGate,
};

/// Text the widgets show. Defaults match the web widgets.
#[derive(Debug, Clone)]
pub(crate) struct Labels {
    pub deposit: String,
    pub withdraw: String,
    pub placeholder: String,
    pub busy: String,
    pub connect: String,
    pub disconnect: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            deposit: "Deposit".into(),
            withdraw: "Withdraw".into(),
            placeholder: "Enter amount".into(),
            busy: "Processing...".into(),
            connect: "Connect Wallet".into(),
            disconnect: "Disconnect Wallet".into(),
        }
    }
}

impl Labels {
    pub(crate) fn title(&self, kind: TransactionKind) -> &str {
        match kind {
            TransactionKind::Deposit => &self.deposit,
            TransactionKind::Withdraw => &self.withdraw,
        }
    }
}

/// Tab strip with the selected tab bracketed.
pub(crate) fn render_tabs(labels: &Labels, selector: &CompositeSelector) -> String {
    TransactionKind::ALL
        .iter()
        .map(|&kind| {
            if kind == selector.selection() {
                format!("[{}]", labels.title(kind))
            } else {
                format!(" {} ", labels.title(kind))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One transaction widget: input line, then button or result.
pub(crate) fn render_transaction(labels: &Labels, controller: &TransactionController) -> String {
    let title = labels.title(controller.kind());
    let input = match controller.amount_input() {
        "" => format!("<{}>", labels.placeholder),
        text => text.to_string(),
    };
    let view = controller.view();
    let footer = match view.phase {
        Phase::Idle => format!("( {title} )"),
        Phase::Pending => labels.busy.clone(),
        Phase::Succeeded | Phase::Failed => view.message.unwrap_or_default(),
    };
    format!("{title}: {input}\n  {footer}")
}

pub(crate) fn render_balance(phase: &BalancePhase) -> String {
    match phase {
        BalancePhase::Loading => "Loading balance...".to_string(),
        BalancePhase::Loaded(balance) => format!("Balance: {}", format_balance(*balance)),
        BalancePhase::Failed(message) => format!("Error: {message}"),
    }
}

/// The wallet affordance. Empty when the session needs no wallet.
pub(crate) fn render_gate(labels: &Labels, gate: &WalletGate) -> String {
    if !gate.has_connector() {
        return String::new();
    }
    match gate.status() {
        GateStatus::ConnectRequired => {
            format!("Wallet not connected. ( {} )", labels.connect)
        }
        GateStatus::Open => format!("Wallet connected. ( {} )", labels.disconnect),
    }
}

pub(crate) fn transaction_output(
    labels: &Labels,
    controller: &TransactionController,
    json: bool,
) -> String {
    if json {
        format_view_json(controller.kind(), &controller.view(), controller.amount_input())
    } else {
        render_transaction(labels, controller)
    }
}

pub(crate) fn balance_output(phase: &BalancePhase, json: bool) -> String {
    if json {
        format_balance_json(phase)
    } else {
        render_balance(phase)
    }
}
