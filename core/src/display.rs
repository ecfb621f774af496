/// Output formatting for token amounts, balances and JSON views.
use crate::balance::BalancePhase;
use crate::controller::ViewState;
use crate::network::TransactionKind;

/// Format a balance for display with two decimals.
/// Examples: 1234.56 -> "1234.56 tokens", 5.0 -> "5.00 tokens"
#[must_use]
pub fn format_balance(balance: f64) -> String {
    format!("{balance:.2} tokens")
}

/// Shortest decimal that round-trips: 50.0 -> "50", 2.5 -> "2.5".
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

/// Format a transaction widget's state as JSON.
#[must_use]
pub fn format_view_json(kind: TransactionKind, view: &ViewState, amount_input: &str) -> String {
    serde_json::json!({
        "kind": kind.to_string(),
        "phase": view.phase.to_string(),
        "message": view.message,
        "amount": amount_input,
    })
    .to_string()
}

/// Format the balance widget's state as JSON.
#[must_use]
pub fn format_balance_json(phase: &BalancePhase) -> String {
    let value = match phase {
        BalancePhase::Loading => serde_json::json!({ "phase": "loading" }),
        BalancePhase::Loaded(balance) => serde_json::json!({
            "phase": "loaded",
            "balance": balance,
        }),
        BalancePhase::Failed(message) => serde_json::json!({
            "phase": "failed",
            "message": message,
        }),
    };
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;

    #[test]
    fn balance_two_decimals() {
        assert_eq!(format_balance(1234.56), "1234.56 tokens");
        assert_eq!(format_balance(5.0), "5.00 tokens");
        assert_eq!(format_balance(0.126), "0.13 tokens");
    }

    #[test]
    fn amount_shortest_form() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(2.5), "2.5");
    }

    #[test]
    fn view_json_output() {
        let view = ViewState {
            phase: Phase::Failed,
            message: Some("Insufficient funds".into()),
        };
        let json = format_view_json(TransactionKind::Withdraw, &view, "20");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["kind"], "withdraw");
        assert_eq!(v["phase"], "failed");
        assert_eq!(v["message"], "Insufficient funds");
        assert_eq!(v["amount"], "20");
    }

    #[test]
    fn view_json_null_message() {
        let view = ViewState {
            phase: Phase::Idle,
            message: None,
        };
        let v: serde_json::Value =
            serde_json::from_str(&format_view_json(TransactionKind::Deposit, &view, "")).unwrap();
        assert!(v["message"].is_null());
    }

    #[test]
    fn balance_json_output() {
        let v: serde_json::Value =
            serde_json::from_str(&format_balance_json(&BalancePhase::Loaded(1234.56))).unwrap();
        assert_eq!(v["phase"], "loaded");
        assert_eq!(v["balance"], 1234.56);
    }
}
