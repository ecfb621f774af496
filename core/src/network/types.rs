use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amount::ValidatedAmount;

/// The three backend calls the widgets make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Deposit,
    Withdraw,
    Balance,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Self::Deposit => "/deposit",
            Self::Withdraw => "/withdraw",
            Self::Balance => "/balance",
        }
    }

    /// Message used when the server doesn't explain a failure.
    pub fn default_failure_message(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit failed",
            Self::Withdraw => "Withdrawal failed",
            Self::Balance => "Failed to fetch balance",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
            Self::Balance => write!(f, "balance"),
        }
    }
}

/// Balance-moving transaction kinds, one widget each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionKind {
    #[default]
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Deposit, TransactionKind::Withdraw];

    pub fn operation(self) -> Operation {
        match self {
            Self::Deposit => Operation::Deposit,
            Self::Withdraw => Operation::Withdraw,
        }
    }

    /// Success line shown once the backend accepted the transaction.
    pub fn success_message(self, amount: ValidatedAmount) -> String {
        match self {
            Self::Deposit => format!("Successfully deposited {amount} tokens."),
            Self::Withdraw => format!("Successfully withdrew {amount} tokens."),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            other => Err(format!(
                "Unknown transaction kind: '{other}'. Use 'deposit' or 'withdraw'."
            )),
        }
    }
}

/// Why a request didn't succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A backend refused the amount before sending anything. The HTTP
    /// client never does this; custom [`TransactionApi`](super::TransactionApi)
    /// backends may return [`WidgetError::Validation`](crate::WidgetError::Validation).
    Validation,
    /// The server said no, or never gave a usable answer.
    Request,
}

/// What came back from one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Success {
        applied_amount: ValidatedAmount,
        /// Response body exactly as the server sent it.
        body: Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// -- Wire types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionRequest<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) access_code: &'a str,
    pub(crate) amount: ValidatedAmount,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub(crate) balance: f64,
}

/// Error envelope; anything that doesn't decode is treated as `{}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
}
